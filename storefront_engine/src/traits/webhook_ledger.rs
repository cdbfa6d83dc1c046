use thiserror::Error;

use crate::{
    db_types::WebhookLogEntry,
    gateway_events::{EventKind, ProcessingOutcome},
};

#[derive(Debug, Clone, Error)]
pub enum ReconciliationError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Webhook log entry {0} does not exist")]
    LogEntryNotFound(i64),
}

impl From<sqlx::Error> for ReconciliationError {
    fn from(e: sqlx::Error) -> Self {
        ReconciliationError::DatabaseError(e.to_string())
    }
}

/// The `WebhookLedger` trait is the audit trail and idempotency ledger for the webhook channel.
///
/// The contract is audit-first: [`record_incoming`](WebhookLedger::record_incoming) persists every delivery before
/// anyone looks at its signature, and [`apply_event`](WebhookLedger::apply_event) runs the idempotency check, the
/// order mutation and the log write-back inside one transaction, so a crash can never leave an order updated with
/// no trace of why, or a delivery marked processed without its effect.
#[allow(async_fn_in_trait)]
pub trait WebhookLedger {
    /// Inserts the raw delivery into the webhook log with `processed = false`, before signature verification.
    /// Returns the stored entry, whose id threads through the rest of the delivery's processing.
    async fn record_incoming(
        &self,
        event: &str,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<WebhookLogEntry, ReconciliationError>;

    /// Marks a delivery as rejected (bad signature). The entry is closed with the rejection result and no
    /// extracted gateway ids, so it can never satisfy the idempotency check.
    async fn mark_rejected(&self, log_id: i64, result: &str) -> Result<(), ReconciliationError>;

    /// Applies a classified event to order state and closes out the log entry, all in one transaction:
    ///
    /// * the gateway payment id (when the event carries one) is checked against every order and every processed
    ///   log entry; a hit short-circuits to [`ProcessingOutcome::AlreadyProcessed`] with no mutation,
    /// * the matching order (by gateway order id) is transitioned per the event kind,
    /// * the log entry is updated with `processed = true`, the extracted gateway ids and the outcome's
    ///   result string.
    ///
    /// Every outcome, including `OrderNotFound` and `Ignored`, closes the log entry; outcomes are data, not errors.
    async fn apply_event(&self, log_id: i64, kind: EventKind) -> Result<ProcessingOutcome, ReconciliationError>;

    async fn fetch_webhook_log(&self, log_id: i64) -> Result<Option<WebhookLogEntry>, ReconciliationError>;

    /// Whether the gateway payment id is already known, via any order or any processed delivery.
    async fn is_payment_processed(&self, gateway_payment_id: &str) -> Result<bool, ReconciliationError>;
}
