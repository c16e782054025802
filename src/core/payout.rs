//! Payout reconciliation - pays all of a worker's eligible receipts as one batch.
//!
//! Receipts are saved one by one. A failed save does not stop the batch: the
//! remaining receipts are still paid and the failure is reported in the
//! returned [`PaymentBatch`], so the caller always knows exactly which receipts
//! changed. Calls for the same worker are serialized by a per-worker lock held
//! for the whole read-then-write sequence.

use crate::{
    core::receipt::ReceiptStore,
    entities::receipt,
    errors::Result,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

/// A receipt whose update could not be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedReceipt {
    /// External receipt identifier
    pub receipt_id: String,
    /// Why the save failed
    pub reason: String,
}

/// Receipts paid together for one worker in one call.
#[derive(Debug, Clone)]
pub struct PaymentBatch {
    /// Worker being paid
    pub player_name: String,
    /// Receipts that transitioned to paid in this call
    pub receipts: Vec<receipt::Model>,
    /// Receipts that stayed unpaid because their save failed
    pub failed: Vec<FailedReceipt>,
    /// Sum of `player_payment` over `receipts`
    pub total_paid: f64,
    /// Timestamp written to every paid receipt
    pub paid_at: DateTime<Utc>,
    /// Who ran the payout
    pub paid_by: String,
}

impl PaymentBatch {
    /// Whether at least one receipt could not be paid.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Result of [`ReceiptReconciler::pay_worker`].
#[derive(Debug, Clone)]
pub enum PayoutOutcome {
    /// Nothing approved and unpaid for this worker
    NoEligibleReceipts {
        /// Worker that was looked up
        player_name: String,
    },
    /// Eligible receipts were processed
    Completed(PaymentBatch),
}

/// Pays out worker receipts through a [`ReceiptStore`].
#[derive(Debug)]
pub struct ReceiptReconciler<S> {
    store: S,
    // Lock per worker name with a payout in flight; dropped once nobody holds
    // or awaits it. The store stays the source of truth.
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl<S: ReceiptStore> ReceiptReconciler<S> {
    /// Creates a reconciler over `store`.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    fn worker_lock(&self, player_name: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            locks
                .entry(player_name.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(()))),
        )
    }

    fn release_lock(&self, player_name: &str, lock: &Arc<AsyncMutex<()>>) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Only the map and `lock` remain: no other call holds or awaits it.
        if Arc::strong_count(lock) == 2 {
            locks.remove(player_name);
        }
    }

    /// Marks every approved, unpaid receipt of `player_name` as paid by
    /// `paid_by`.
    ///
    /// Returns `NoEligibleReceipts` when there is nothing to pay. Failing to
    /// list receipts is an error; failing to save one receipt is reported in
    /// the batch.
    pub async fn pay_worker(&self, player_name: &str, paid_by: &str) -> Result<PayoutOutcome> {
        let player_name = player_name.trim();
        let lock = self.worker_lock(player_name);
        let outcome = {
            let _guard = lock.lock().await;
            self.pay_locked(player_name, paid_by).await
        };
        self.release_lock(player_name, &lock);
        outcome
    }

    async fn pay_locked(&self, player_name: &str, paid_by: &str) -> Result<PayoutOutcome> {
        let eligible: Vec<receipt::Model> = self
            .store
            .list_unpaid_approved(player_name)
            .await?
            .into_iter()
            .filter(|r| r.approved && !r.paid)
            .collect();

        if eligible.is_empty() {
            info!(player = %player_name, "no eligible receipts to pay");
            return Ok(PayoutOutcome::NoEligibleReceipts {
                player_name: player_name.to_string(),
            });
        }

        let paid_at = Utc::now();
        let mut receipts = Vec::with_capacity(eligible.len());
        let mut failed = Vec::new();
        let mut total_paid = 0.0;

        for receipt in eligible {
            let updated = receipt::Model {
                paid: true,
                paid_at: Some(paid_at),
                paid_by: Some(paid_by.to_string()),
                ..receipt
            };

            match self.store.save(&updated).await {
                Ok(()) => {
                    debug!(receipt_id = %updated.receipt_id, amount = updated.player_payment, "receipt paid");
                    total_paid += updated.player_payment;
                    receipts.push(updated);
                }
                Err(e) => {
                    warn!(receipt_id = %updated.receipt_id, error = %e, "failed to mark receipt as paid");
                    failed.push(FailedReceipt {
                        receipt_id: updated.receipt_id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            player = %player_name,
            paid = receipts.len(),
            failed = failed.len(),
            total = total_paid,
            "payout batch finished"
        );

        Ok(PayoutOutcome::Completed(PaymentBatch {
            player_name: player_name.to_string(),
            receipts,
            failed,
            total_paid,
            paid_at,
            paid_by: paid_by.to_string(),
        }))
    }
}

/// Formats a payout batch into a human-readable summary.
pub fn format_payout_summary(batch: &PaymentBatch) -> Result<String> {
    use std::fmt::Write;

    let mut summary = format!(
        "Pagamento de {} - {} recibo(s) - Total: ${:.2}\n",
        batch.player_name,
        batch.receipts.len(),
        batch.total_paid
    );

    for receipt in &batch.receipts {
        let subject = receipt
            .animal_type
            .as_deref()
            .or(receipt.plant_name.as_deref())
            .unwrap_or("-");
        writeln!(
            &mut summary,
            "  {} | {} {}x {} | ${:.2}",
            receipt.receipt_id,
            receipt.service_type,
            receipt.quantity,
            subject,
            receipt.player_payment
        )?;
    }

    if batch.is_partial() {
        writeln!(&mut summary, "  Falharam {} recibo(s):", batch.failed.len())?;
        for failure in &batch.failed {
            writeln!(&mut summary, "  {} - {}", failure.receipt_id, failure.reason)?;
        }
    }

    Ok(summary)
}
