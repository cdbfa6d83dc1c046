use serde::{Deserialize, Serialize};
use storefront_common::Paise;

/// The request body for the gateway's order creation endpoint.
///
/// `payment_capture: 1` asks the gateway to capture funds automatically on authorisation, so that a single
/// `payment.captured` webhook confirms the payment.
#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderRequest {
    pub amount: Paise,
    pub currency: String,
    pub receipt: String,
    pub payment_capture: u8,
}

/// The subset of the gateway's order entity that the storefront consumes.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteOrder {
    pub id: String,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}
