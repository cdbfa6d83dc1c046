use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use razorpay_tools::RazorpayApiError;
use storefront_engine::traits::{CartApiError, CheckoutError, ReconciliationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Auth token signature invalid or not provided")]
    CouldNotValidateAuthToken,
    #[error("No shopper identity was provided. Sign in, or supply an X-Session-Id header.")]
    NoShopperIdentity,
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("Cannot check out: {0}")]
    CheckoutRejected(String),
    #[error("The payment gateway could not be reached. {0}")]
    GatewayUnavailable(String),
    #[error("The payment signature did not verify")]
    InvalidPaymentSignature,
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::CheckoutRejected(_) => StatusCode::BAD_REQUEST,
            Self::CouldNotValidateAuthToken => StatusCode::UNAUTHORIZED,
            Self::NoShopperIdentity => StatusCode::UNAUTHORIZED,
            Self::InvalidPaymentSignature => StatusCode::UNAUTHORIZED,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::GatewayUnavailable(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<CheckoutError> for ServerError {
    fn from(e: CheckoutError) -> Self {
        match e {
            CheckoutError::EmptyCart | CheckoutError::InsufficientStock { .. } | CheckoutError::ProductNotFound(_) => {
                Self::CheckoutRejected(e.to_string())
            },
            CheckoutError::OrderNotFound(id) => Self::NoRecordFound(format!("Order {id}")),
            CheckoutError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            CheckoutError::CartError(e) => Self::BackendError(format!("Cart error: {e}")),
        }
    }
}

impl From<CartApiError> for ServerError {
    fn from(e: CartApiError) -> Self {
        match e {
            CartApiError::ProductNotFound(id) => Self::NoRecordFound(format!("Product {id}")),
            CartApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            CartApiError::CorruptSessionCart(e) => Self::BackendError(format!("Session cart error: {e}")),
        }
    }
}

impl From<ReconciliationError> for ServerError {
    fn from(e: ReconciliationError) -> Self {
        Self::BackendError(e.to_string())
    }
}

impl From<RazorpayApiError> for ServerError {
    fn from(e: RazorpayApiError) -> Self {
        Self::GatewayUnavailable(e.to_string())
    }
}
