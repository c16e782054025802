//! Receipt business logic - recording, approving and querying worker receipts.
//!
//! The reconciler only needs two operations from persistence, expressed by the
//! [`ReceiptStore`] trait: list a worker's approved-but-unpaid receipts and save
//! one receipt. [`DbReceiptStore`] implements them on `SeaORM`; its `save` only
//! writes over a row that is still unpaid, so a paid receipt never changes again
//! and two processes can never both pay the same receipt.

use crate::{
    entities::{Receipt, receipt},
    errors::{Error, Result},
};
use async_trait::async_trait;
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};
use std::fmt;
use tracing::debug;

/// Kind of service a receipt pays for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceType {
    /// Animal care (feeding, slaughter runs)
    Animal,
    /// Planting and harvesting
    Planta,
}

impl ServiceType {
    /// Stored name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Animal => "animal",
            Self::Planta => "planta",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input for [`create_receipt`].
#[derive(Debug, Clone)]
pub struct NewReceipt {
    /// External receipt identifier
    pub receipt_id: String,
    /// Worker who performed the service
    pub player_name: String,
    /// Animal or plant service
    pub service_type: ServiceType,
    /// Animals handled or plants harvested
    pub quantity: i32,
    /// Animal handled, for animal services
    pub animal_type: Option<String>,
    /// Plant harvested, for plant services
    pub plant_name: Option<String>,
    /// Amount owed to the worker
    pub player_payment: f64,
}

/// Persistence operations the reconciler depends on.
#[async_trait]
pub trait ReceiptStore: Send + Sync {
    /// Approved, unpaid receipts of `player_name`, oldest first.
    async fn list_unpaid_approved(&self, player_name: &str) -> Result<Vec<receipt::Model>>;

    /// Persists the mutable fields of `receipt`.
    ///
    /// Fails with `ReceiptAlreadyPaid` when the stored receipt is already paid.
    async fn save(&self, receipt: &receipt::Model) -> Result<()>;
}

/// `ReceiptStore` backed by the application database.
#[derive(Debug)]
pub struct DbReceiptStore {
    db: DatabaseConnection,
}

impl DbReceiptStore {
    /// Wraps a database connection.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// The underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl ReceiptStore for DbReceiptStore {
    async fn list_unpaid_approved(&self, player_name: &str) -> Result<Vec<receipt::Model>> {
        get_unpaid_approved_receipts(&self.db, player_name).await
    }

    async fn save(&self, receipt: &receipt::Model) -> Result<()> {
        let changes = receipt::ActiveModel {
            approved: Set(receipt.approved),
            paid: Set(receipt.paid),
            paid_at: Set(receipt.paid_at),
            paid_by: Set(receipt.paid_by.clone()),
            ..Default::default()
        };

        // Optimistic check: a paid row is never written again.
        let result = Receipt::update_many()
            .set(changes)
            .filter(receipt::Column::Id.eq(receipt.id))
            .filter(receipt::Column::Paid.eq(false))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            let receipt_id = receipt.receipt_id.clone();
            let exists = Receipt::find_by_id(receipt.id).one(&self.db).await?.is_some();
            return Err(if exists {
                Error::ReceiptAlreadyPaid { receipt_id }
            } else {
                Error::ReceiptNotFound { receipt_id }
            });
        }

        debug!(receipt_id = %receipt.receipt_id, paid = receipt.paid, "saved receipt");
        Ok(())
    }
}

/// Records a new, not yet approved receipt.
///
/// Rejects blank identifiers or player names and payments that are negative or
/// not finite.
pub async fn create_receipt(db: &DatabaseConnection, new: NewReceipt) -> Result<receipt::Model> {
    if new.receipt_id.trim().is_empty() {
        return Err(Error::Config {
            message: "Receipt id cannot be empty".to_string(),
        });
    }

    if new.player_name.trim().is_empty() {
        return Err(Error::Config {
            message: "Player name cannot be empty".to_string(),
        });
    }

    if !new.player_payment.is_finite() || new.player_payment < 0.0 {
        return Err(Error::InvalidAmount {
            amount: new.player_payment,
        });
    }

    let model = receipt::ActiveModel {
        receipt_id: Set(new.receipt_id.trim().to_string()),
        player_name: Set(new.player_name.trim().to_string()),
        service_type: Set(new.service_type.as_str().to_string()),
        quantity: Set(new.quantity),
        animal_type: Set(new.animal_type),
        plant_name: Set(new.plant_name),
        player_payment: Set(new.player_payment),
        approved: Set(false),
        paid: Set(false),
        paid_at: Set(None),
        paid_by: Set(None),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    model.insert(db).await.map_err(Into::into)
}

/// Finds a receipt by its external identifier.
pub async fn get_receipt(
    db: &DatabaseConnection,
    receipt_id: &str,
) -> Result<Option<receipt::Model>> {
    Receipt::find()
        .filter(receipt::Column::ReceiptId.eq(receipt_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Marks a receipt approved, making it eligible for payment.
pub async fn approve_receipt(db: &DatabaseConnection, receipt_id: &str) -> Result<receipt::Model> {
    let existing = get_receipt(db, receipt_id)
        .await?
        .ok_or_else(|| Error::ReceiptNotFound {
            receipt_id: receipt_id.to_string(),
        })?;

    if existing.approved {
        return Ok(existing);
    }

    let mut active: receipt::ActiveModel = existing.into();
    active.approved = Set(true);
    active.update(db).await.map_err(Into::into)
}

/// Approved, unpaid receipts of one worker, oldest first.
pub async fn get_unpaid_approved_receipts(
    db: &DatabaseConnection,
    player_name: &str,
) -> Result<Vec<receipt::Model>> {
    Receipt::find()
        .filter(receipt::Column::PlayerName.eq(player_name))
        .filter(receipt::Column::Approved.eq(true))
        .filter(receipt::Column::Paid.eq(false))
        .order_by_asc(receipt::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Names of every worker with at least one approved, unpaid receipt, sorted.
pub async fn get_players_with_pending_payments(db: &DatabaseConnection) -> Result<Vec<String>> {
    Receipt::find()
        .select_only()
        .column(receipt::Column::PlayerName)
        .filter(receipt::Column::Approved.eq(true))
        .filter(receipt::Column::Paid.eq(false))
        .distinct()
        .order_by_asc(receipt::Column::PlayerName)
        .into_tuple::<String>()
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_receipt_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let mut blank_player = new_receipt("r1", "Joao", 10.0);
        blank_player.player_name = "  ".to_string();
        let result = create_receipt(&db, blank_player).await;
        assert!(matches!(result, Err(Error::Config { .. })));

        let result = create_receipt(&db, new_receipt("r1", "Joao", -1.0)).await;
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));

        let result = create_receipt(&db, new_receipt("r1", "Joao", f64::NAN)).await;
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));

        let result = create_receipt(&db, new_receipt("", "Joao", 1.0)).await;
        assert!(matches!(result, Err(Error::Config { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_receipt_starts_unapproved_and_unpaid() -> Result<()> {
        let db = setup_test_db().await?;
        let receipt = create_receipt(&db, new_receipt("r1", " Joao ", 25.0)).await?;

        assert_eq!(receipt.player_name, "Joao");
        assert_eq!(receipt.service_type, "animal");
        assert!(!receipt.approved);
        assert!(!receipt.paid);
        assert!(receipt.paid_at.is_none());
        assert!(get_unpaid_approved_receipts(&db, "Joao").await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_approve_receipt() -> Result<()> {
        let db = setup_test_db().await?;
        create_receipt(&db, new_receipt("r1", "Joao", 25.0)).await?;

        let approved = approve_receipt(&db, "r1").await?;
        assert!(approved.approved);

        let again = approve_receipt(&db, "r1").await?;
        assert_eq!(again, approved);

        let missing = approve_receipt(&db, "nope").await;
        assert!(matches!(missing, Err(Error::ReceiptNotFound { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_unpaid_approved_filters() -> Result<()> {
        let db = setup_test_db().await?;
        create_approved_receipt(&db, "r1", "Joao", 10.0).await?;
        create_approved_receipt(&db, "r2", "Joao", 20.0).await?;
        create_approved_receipt(&db, "r3", "Maria", 30.0).await?;
        create_receipt(&db, new_receipt("r4", "Joao", 40.0)).await?;

        let receipts = get_unpaid_approved_receipts(&db, "Joao").await?;
        let ids: Vec<&str> = receipts.iter().map(|r| r.receipt_id.as_str()).collect();
        assert_eq!(ids, ["r1", "r2"]);

        Ok(())
    }

    #[tokio::test]
    async fn test_players_with_pending_payments() -> Result<()> {
        let db = setup_test_db().await?;
        create_approved_receipt(&db, "r1", "Maria", 10.0).await?;
        create_approved_receipt(&db, "r2", "Joao", 20.0).await?;
        create_approved_receipt(&db, "r3", "Joao", 30.0).await?;
        create_receipt(&db, new_receipt("r4", "Carlos", 40.0)).await?;

        let players = get_players_with_pending_payments(&db).await?;
        assert_eq!(players, ["Joao", "Maria"]);

        Ok(())
    }

    #[tokio::test]
    async fn test_db_store_save_marks_paid_once() -> Result<()> {
        let db = setup_test_db().await?;
        let receipt = create_approved_receipt(&db, "r1", "Joao", 10.0).await?;
        let store = DbReceiptStore::new(db);

        let paid = receipt::Model {
            paid: true,
            paid_at: Some(chrono::Utc::now()),
            paid_by: Some("admin".to_string()),
            ..receipt
        };
        store.save(&paid).await?;

        let stored = get_receipt(store.connection(), "r1").await?.unwrap();
        assert!(stored.paid);
        assert_eq!(stored.paid_by.as_deref(), Some("admin"));

        let second = store.save(&paid).await;
        assert!(matches!(second, Err(Error::ReceiptAlreadyPaid { .. })));

        assert!(store.list_unpaid_approved("Joao").await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_db_store_refuses_to_unpay_receipt() -> Result<()> {
        let db = setup_test_db().await?;
        let receipt = create_approved_receipt(&db, "r1", "Joao", 10.0).await?;
        let store = DbReceiptStore::new(db);

        let paid = receipt::Model {
            paid: true,
            paid_at: Some(chrono::Utc::now()),
            paid_by: Some("admin".to_string()),
            ..receipt.clone()
        };
        store.save(&paid).await?;

        let reverted = receipt::Model {
            paid: false,
            paid_at: None,
            paid_by: None,
            ..receipt
        };
        let result = store.save(&reverted).await;
        assert!(matches!(result, Err(Error::ReceiptAlreadyPaid { .. })));

        let stored = get_receipt(store.connection(), "r1").await?.unwrap();
        assert!(stored.paid);
        assert!(stored.paid_at.is_some());
        assert_eq!(stored.paid_by.as_deref(), Some("admin"));

        Ok(())
    }

    #[tokio::test]
    async fn test_db_store_save_missing_receipt() -> Result<()> {
        let db = setup_test_db().await?;
        let receipt = create_approved_receipt(&db, "r1", "Joao", 10.0).await?;
        let store = DbReceiptStore::new(db);

        let ghost = receipt::Model {
            id: 999,
            receipt_id: "ghost".to_string(),
            ..receipt
        };
        let result = store.save(&ghost).await;
        assert!(matches!(result, Err(Error::ReceiptNotFound { .. })));

        Ok(())
    }
}
