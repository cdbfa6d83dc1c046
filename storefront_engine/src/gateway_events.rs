//! Typed decode of inbound gateway webhook events.
//!
//! The gateway posts `{ "event": "<name>", "payload": { ... } }` where the payload nests the relevant entity under
//! `payment.entity`, `order.entity` or `refund.entity` depending on the event family. Events are decoded into an
//! explicit [`EventKind`] with an `Unknown` fallback; no handler ever reaches into untyped JSON.

use serde::Deserialize;

//--------------------------------------     wire format      --------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayEvent {
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub payload: EventEnvelope,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventEnvelope {
    #[serde(default)]
    pub payment: Option<Wrapped<PaymentEntity>>,
    #[serde(default)]
    pub order: Option<Wrapped<OrderEntity>>,
    #[serde(default)]
    pub refund: Option<Wrapped<RefundEntity>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Wrapped<T> {
    pub entity: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentEntity {
    /// The gateway payment id, the primary idempotency key for reconciliation.
    pub id: String,
    /// The gateway order id this payment belongs to.
    #[serde(default)]
    pub order_id: String,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderEntity {
    /// The gateway order id.
    pub id: String,
    #[serde(default)]
    pub amount: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefundEntity {
    pub id: String,
    #[serde(default)]
    pub payment_id: String,
}

//--------------------------------------     classification   --------------------------------------------------------

/// A fully classified gateway event, ready for dispatch by the reconciliation engine.
#[derive(Debug, Clone)]
pub enum EventKind {
    PaymentCaptured(PaymentEntity),
    PaymentFailed(PaymentEntity),
    OrderPaid(OrderEntity),
    /// Any `refund.*` event. Audited, never applied to order state.
    Refund { event: String, refund: RefundEntity },
    /// A known event family arrived without the entity it is defined by.
    MissingEntity { expected: &'static str },
    /// An event the storefront intentionally does not handle.
    Unknown(String),
}

impl GatewayEvent {
    /// Parse raw body bytes into a `GatewayEvent`. `None` means the body is not valid JSON of the expected shape.
    pub fn from_bytes(body: &[u8]) -> Option<Self> {
        serde_json::from_slice(body).ok()
    }

    /// Best-effort extraction of the event name for the audit log, before any verification has happened.
    pub fn event_name_from_bytes(body: &[u8]) -> String {
        Self::from_bytes(body)
            .map(|e| e.event)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "unknown".to_string())
    }

    pub fn classify(self) -> EventKind {
        match self.event.as_str() {
            "payment.captured" => match self.payload.payment {
                Some(p) => EventKind::PaymentCaptured(p.entity),
                None => EventKind::MissingEntity { expected: "payment" },
            },
            "payment.failed" => match self.payload.payment {
                Some(p) => EventKind::PaymentFailed(p.entity),
                None => EventKind::MissingEntity { expected: "payment" },
            },
            "order.paid" => match self.payload.order {
                Some(o) => EventKind::OrderPaid(o.entity),
                None => EventKind::MissingEntity { expected: "order" },
            },
            s if s.starts_with("refund.") => match self.payload.refund {
                Some(r) => EventKind::Refund { event: self.event, refund: r.entity },
                None => EventKind::MissingEntity { expected: "refund" },
            },
            _ => EventKind::Unknown(self.event),
        }
    }
}

//--------------------------------------  processing outcome  --------------------------------------------------------

/// The terminal result of processing one webhook delivery. Its string form is written back to the delivery's
/// [`crate::db_types::WebhookLogEntry`] as the processing result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessingOutcome {
    PaymentCaptured,
    /// The payment id was already recorded on an order or a processed log entry; nothing was mutated.
    AlreadyProcessed(String),
    PaymentFailed,
    OrderMarkedPaid,
    /// The order was already Approved/Captured when an `order.paid` event arrived; nothing was mutated.
    OrderAlreadyPaid,
    /// No order matches the event's gateway order id. Acknowledged so the gateway stops retrying.
    OrderNotFound,
    RefundRecorded(String),
    Ignored(String),
    MissingEntity(&'static str),
}

impl ProcessingOutcome {
    /// The string persisted in the webhook log's `processing_result` column.
    pub fn result_string(&self) -> String {
        match self {
            ProcessingOutcome::PaymentCaptured => "PaymentCaptured".to_string(),
            ProcessingOutcome::AlreadyProcessed(id) => format!("AlreadyProcessed:{id}"),
            ProcessingOutcome::PaymentFailed => "PaymentFailed".to_string(),
            ProcessingOutcome::OrderMarkedPaid => "OrderMarkedPaid".to_string(),
            ProcessingOutcome::OrderAlreadyPaid => "OrderAlreadyPaid".to_string(),
            ProcessingOutcome::OrderNotFound => "OrderNotFound".to_string(),
            ProcessingOutcome::RefundRecorded(id) => format!("RefundReceived:{id}"),
            ProcessingOutcome::Ignored(event) => format!("Ignored:{event}"),
            ProcessingOutcome::MissingEntity(expected) => match *expected {
                "payment" => "MissingPaymentEntity".to_string(),
                "order" => "MissingOrderEntity".to_string(),
                "refund" => "MissingRefundEntity".to_string(),
                other => format!("Missing{other}Entity"),
            },
        }
    }
}
