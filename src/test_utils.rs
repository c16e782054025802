//! Shared test utilities.
//!
//! Helpers for setting up an in-memory database, building messages and
//! receipts with sensible defaults, and an in-memory `ReceiptStore` that can be
//! told to fail.

#![allow(clippy::unwrap_used)]

use crate::{
    config::parser::ParserConfig,
    core::{
        ActivityParser,
        receipt::{self, NewReceipt, ReceiptStore, ServiceType},
    },
    entities,
    errors::{Error, Result},
    models::RawMessage,
};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use sea_orm::DatabaseConnection;
use std::collections::HashSet;
use std::sync::Mutex;

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Parser with the built-in item table and display limit.
pub fn test_parser() -> ActivityParser {
    ActivityParser::new(&ParserConfig::default()).unwrap()
}

/// Message stamped 2024-03-15 14:30:25 UTC, without embeds.
pub fn message(id: &str, author: &str, content: &str) -> RawMessage {
    let ts = Utc.with_ymd_and_hms(2024, 3, 15, 14, 30, 25).unwrap();
    RawMessage::new(id, author, content, ts)
}

/// Receipt input with sensible defaults.
///
/// # Defaults
/// * `service_type`: animal
/// * `quantity`: 1
/// * `animal_type`: `"cow_female"`
pub fn new_receipt(receipt_id: &str, player_name: &str, player_payment: f64) -> NewReceipt {
    NewReceipt {
        receipt_id: receipt_id.to_string(),
        player_name: player_name.to_string(),
        service_type: ServiceType::Animal,
        quantity: 1,
        animal_type: Some("cow_female".to_string()),
        plant_name: None,
        player_payment,
    }
}

/// Creates and approves a receipt.
pub async fn create_approved_receipt(
    db: &DatabaseConnection,
    receipt_id: &str,
    player_name: &str,
    player_payment: f64,
) -> Result<entities::receipt::Model> {
    receipt::create_receipt(db, new_receipt(receipt_id, player_name, player_payment)).await?;
    receipt::approve_receipt(db, receipt_id).await
}

/// Receipt model built in memory, for stores that do not touch the database.
pub fn receipt_model(
    id: i64,
    receipt_id: &str,
    player_name: &str,
    player_payment: f64,
    approved: bool,
    paid: bool,
) -> entities::receipt::Model {
    entities::receipt::Model {
        id,
        receipt_id: receipt_id.to_string(),
        player_name: player_name.to_string(),
        service_type: ServiceType::Animal.as_str().to_string(),
        quantity: 1,
        animal_type: Some("cow_female".to_string()),
        plant_name: None,
        player_payment,
        approved,
        paid,
        paid_at: None,
        paid_by: None,
        created_at: Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap(),
    }
}

/// In-memory `ReceiptStore` with failure injection.
#[derive(Debug, Default)]
pub struct MemoryReceiptStore {
    receipts: Mutex<Vec<entities::receipt::Model>>,
    failing_saves: HashSet<String>,
    failing_listing: bool,
}

impl MemoryReceiptStore {
    /// Store holding `receipts`.
    pub fn new(receipts: Vec<entities::receipt::Model>) -> Self {
        Self {
            receipts: Mutex::new(receipts),
            ..Self::default()
        }
    }

    /// Makes every save of `receipt_id` fail.
    pub fn failing_on(mut self, receipt_id: &str) -> Self {
        self.failing_saves.insert(receipt_id.to_string());
        self
    }

    /// Makes listing fail.
    pub const fn failing_listing(mut self) -> Self {
        self.failing_listing = true;
        self
    }
}

#[async_trait]
impl ReceiptStore for MemoryReceiptStore {
    async fn list_unpaid_approved(
        &self,
        player_name: &str,
    ) -> Result<Vec<entities::receipt::Model>> {
        if self.failing_listing {
            return Err(Error::Config {
                message: "listing unavailable".to_string(),
            });
        }
        Ok(self
            .receipts
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.player_name == player_name && r.approved && !r.paid)
            .cloned()
            .collect())
    }

    async fn save(&self, receipt: &entities::receipt::Model) -> Result<()> {
        if self.failing_saves.contains(&receipt.receipt_id) {
            return Err(Error::Config {
                message: format!("simulated write failure for {}", receipt.receipt_id),
            });
        }
        let mut receipts = self.receipts.lock().unwrap();
        let stored = receipts
            .iter_mut()
            .find(|r| r.id == receipt.id)
            .ok_or_else(|| Error::ReceiptNotFound {
                receipt_id: receipt.receipt_id.clone(),
            })?;
        if stored.paid {
            return Err(Error::ReceiptAlreadyPaid {
                receipt_id: receipt.receipt_id.clone(),
            });
        }
        *stored = receipt.clone();
        Ok(())
    }
}
