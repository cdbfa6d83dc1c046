use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use storefront_common::Paise;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Invalid value: {0}")]
pub struct ConversionError(String);

//--------------------------------------      ShopperId       --------------------------------------------------------
/// The per-request identity capability: either a stable authenticated user id, or the anonymous session handle a
/// guest carries. Cart operations dispatch on this; nothing else about the auth framework leaks into the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShopperId {
    Customer(String),
    Guest(String),
}

impl ShopperId {
    /// The key used as `customer_id` on orders placed by this shopper.
    pub fn customer_key(&self) -> &str {
        match self {
            ShopperId::Customer(id) => id,
            ShopperId::Guest(session_id) => session_id,
        }
    }
}

impl Display for ShopperId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShopperId::Customer(id) => write!(f, "customer:{id}"),
            ShopperId::Guest(session_id) => write!(f, "guest:{session_id}"),
        }
    }
}

//--------------------------------------     OrderStatus      --------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatus {
    /// The order has been created; payment (if any) has not been confirmed by the gateway yet.
    Pending,
    /// The gateway has confirmed payment and the order can be fulfilled.
    Approved,
    Shipped,
    Delivered,
    /// The order has been cancelled, either by a failed payment or by an operator.
    Cancelled,
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Approved => "Approved",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        };
        write!(f, "{s}")
    }
}

impl FromStr for OrderStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Approved" => Ok(Self::Approved),
            "Shipped" => Ok(Self::Shipped),
            "Delivered" => Ok(Self::Delivered),
            "Cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to Pending");
            OrderStatus::Pending
        })
    }
}

//--------------------------------------    PaymentStatus     --------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// No confirmation from the gateway yet. The client verify call never moves an order past this state.
    Pending,
    Completed,
    Failed,
    /// The gateway has confirmed that funds are secured.
    Captured,
    Cancelled,
    Refunded,
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Completed => "Completed",
            PaymentStatus::Failed => "Failed",
            PaymentStatus::Captured => "Captured",
            PaymentStatus::Cancelled => "Cancelled",
            PaymentStatus::Refunded => "Refunded",
        };
        write!(f, "{s}")
    }
}

impl FromStr for PaymentStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Completed" => Ok(Self::Completed),
            "Failed" => Ok(Self::Failed),
            "Captured" => Ok(Self::Captured),
            "Cancelled" => Ok(Self::Cancelled),
            "Refunded" => Ok(Self::Refunded),
            s => Err(ConversionError(format!("Invalid payment status: {s}"))),
        }
    }
}

impl From<String> for PaymentStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid payment status: {value}. But this conversion cannot fail. Defaulting to Pending");
            PaymentStatus::Pending
        })
    }
}

//--------------------------------------    PaymentMethod     --------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Cash on delivery. The order is accepted terminally at creation; no reconciliation leg follows.
    Cod,
    /// Online payment through the gateway. The order stays Pending until the webhook channel confirms it.
    Online,
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Cod => write!(f, "Cod"),
            PaymentMethod::Online => write!(f, "Online"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Cod" => Ok(Self::Cod),
            "Online" => Ok(Self::Online),
            s => Err(ConversionError(format!("Invalid payment method: {s}"))),
        }
    }
}

impl From<String> for PaymentMethod {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid payment method: {value}. But this conversion cannot fail. Defaulting to Cod");
            PaymentMethod::Cod
        })
    }
}

//--------------------------------------        Order         --------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub customer_id: String,
    pub customer_name: String,
    pub email: String,
    pub address: String,
    pub payment_method: PaymentMethod,
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
    /// Snapshot total at creation time: Σ(item price × quantity) over the order's items.
    pub total_amount: Paise,
    /// The order id assigned by the payment gateway, once a remote order has been created.
    pub gateway_order_id: Option<String>,
    /// The payment id assigned by the gateway. Written tentatively by the verify call, authoritatively by the
    /// webhook channel.
    pub gateway_payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

//--------------------------------------       NewOrder       --------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: String,
    pub customer_name: String,
    pub email: String,
    pub address: String,
    pub payment_method: PaymentMethod,
}

//--------------------------------------      OrderItem       --------------------------------------------------------
/// An immutable snapshot of one cart line at checkout time. Never mutated after creation.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub image_url: String,
    /// The unit price at the time of checkout, not the live catalog price.
    pub price: Paise,
    pub quantity: i64,
}

//--------------------------------------       Product        --------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub image_url: String,
    pub price: Paise,
    pub stock_quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------       CartLine       --------------------------------------------------------
/// One line of a shopper's cart as presented to callers: a product reference plus a display snapshot.
///
/// For guests this is the exact serialized form held in the session-cart store; for customers it is produced by
/// joining cart items against the product catalog.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: i64,
    pub product_name: String,
    pub image_url: String,
    pub price: Paise,
    pub quantity: i64,
}

//--------------------------------------   WebhookLogEntry    --------------------------------------------------------
/// Append-only audit record for an inbound gateway delivery, and the idempotency ledger for reconciliation.
///
/// A row is inserted (with `processed = false`) before the delivery's signature is even looked at, so rejected or
/// malformed deliveries remain forensically recoverable. The row is updated in place as processing completes and is
/// never deleted.
#[derive(Debug, Clone, FromRow)]
pub struct WebhookLogEntry {
    pub id: i64,
    /// Event name as claimed by the body, or "unknown" when the body could not be parsed.
    pub event: String,
    /// The raw request body, byte for byte.
    pub payload: Vec<u8>,
    /// The raw value of the signature header, verified or not.
    pub signature_header: String,
    pub gateway_payment_id: Option<String>,
    pub gateway_order_id: Option<String>,
    pub received_at: DateTime<Utc>,
    pub processed: bool,
    pub processing_result: Option<String>,
}
