//! Activity entity - One ingested chat-log line and its classification.
//!
//! The fingerprint column is unique so that re-ingesting an overlapping range
//! of history cannot store the same event twice.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Activity database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "activities")]
pub struct Model {
    /// Surrogate key
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Id of the first delivery of this event
    pub message_id: String,
    /// Deduplication key (`author|timestamp|quantity|item|amount|animals`)
    #[sea_orm(unique)]
    pub fingerprint: String,
    /// Player responsible for the event
    pub author: String,
    /// Timestamp of the source message
    pub timestamp: DateTimeUtc,
    /// Original text
    pub content: String,
    /// `adicionar`, `remover`, `deposito`, `saque` or `venda`
    pub kind: Option<String>,
    /// `inventario`, `financeiro` or `sistema`
    pub category: String,
    /// Canonical item name
    pub item: Option<String>,
    /// Item or animal count
    pub quantity: Option<i64>,
    /// Money involved
    pub amount: Option<f64>,
    /// Short summary
    pub description: Option<String>,
    /// Dashboard rendering
    pub display_text: String,
    /// Whether a matcher recognized the line
    pub parse_success: bool,
    /// `high`, `medium`, `low` or `none`
    pub confidence: String,
}

/// Activities have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
