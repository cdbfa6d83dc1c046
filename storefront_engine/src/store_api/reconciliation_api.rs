use log::*;

use crate::{
    db_types::WebhookLogEntry,
    gateway_events::{EventKind, GatewayEvent, ProcessingOutcome},
    traits::{ReconciliationError, WebhookLedger},
};

/// Result string recorded against deliveries whose signature did not verify.
pub const RESULT_INVALID_SIGNATURE: &str = "InvalidSignature";

/// The webhook audit-and-apply pipeline.
///
/// The caller's contract has three steps, in order:
/// 1. [`record_incoming`](Self::record_incoming) for every delivery, before any verification,
/// 2. verify the signature itself (the engine never sees secrets), then either
/// 3. [`reject`](Self::reject) the delivery, or [`process`](Self::process) it.
#[derive(Debug, Clone)]
pub struct ReconciliationApi<B> {
    db: B,
}

impl<B: WebhookLedger> ReconciliationApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Persists the raw delivery, unverified, and returns the ledger entry.
    pub async fn record_incoming(
        &self,
        body: &[u8],
        signature_header: &str,
    ) -> Result<WebhookLogEntry, ReconciliationError> {
        let event = GatewayEvent::event_name_from_bytes(body);
        self.db.record_incoming(&event, body, signature_header).await
    }

    /// Closes the delivery's ledger entry with a rejection result. No business state has been touched by then.
    pub async fn reject(&self, log_id: i64, result: &str) -> Result<(), ReconciliationError> {
        self.db.mark_rejected(log_id, result).await
    }

    /// Classifies the (signature-verified) body and applies it to order state, idempotently. Every delivery gets a
    /// terminal [`ProcessingOutcome`]; a body that does not decode is processed as an unknown event.
    pub async fn process(&self, log_id: i64, body: &[u8]) -> Result<ProcessingOutcome, ReconciliationError> {
        let kind = match GatewayEvent::from_bytes(body) {
            Some(event) => event.classify(),
            None => EventKind::Unknown("unknown".to_string()),
        };
        let outcome = self.db.apply_event(log_id, kind).await?;
        debug!("🛍️ Webhook entry #{log_id} processed: {}", outcome.result_string());
        Ok(outcome)
    }

    pub async fn webhook_log(&self, log_id: i64) -> Result<Option<WebhookLogEntry>, ReconciliationError> {
        self.db.fetch_webhook_log(log_id).await
    }

    pub async fn is_payment_processed(&self, gateway_payment_id: &str) -> Result<bool, ReconciliationError> {
        self.db.is_payment_processed(gateway_payment_id).await
    }
}
