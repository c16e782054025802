//! Receipt entity - A worker's record of a completed farm service.
//!
//! Receipts are created when a service submission is approved elsewhere and are
//! paid out in batches by the reconciler. A paid receipt is never modified again.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Receipt database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "receipts")]
pub struct Model {
    /// Surrogate key
    #[sea_orm(primary_key)]
    pub id: i64,
    /// External receipt identifier
    #[sea_orm(unique)]
    pub receipt_id: String,
    /// In-game name of the worker who performed the service
    pub player_name: String,
    /// `"animal"` or `"planta"`
    pub service_type: String,
    /// Animals handled or plants harvested
    pub quantity: i32,
    /// Animal handled, for animal services
    pub animal_type: Option<String>,
    /// Plant harvested, for plant services
    pub plant_name: Option<String>,
    /// Amount owed to the worker
    pub player_payment: f64,
    /// Set by the approval workflow
    pub approved: bool,
    /// Set once by the reconciler
    pub paid: bool,
    /// When the payout happened
    pub paid_at: Option<DateTimeUtc>,
    /// Who ran the payout
    pub paid_by: Option<String>,
    /// When the receipt was recorded
    pub created_at: DateTimeUtc,
}

/// Receipts have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
