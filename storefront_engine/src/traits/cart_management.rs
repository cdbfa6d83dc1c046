use thiserror::Error;

use crate::db_types::{CartLine, ShopperId};

#[derive(Debug, Clone, Error)]
pub enum CartApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Product {0} does not exist")]
    ProductNotFound(i64),
    #[error("Could not decode stored session cart: {0}")]
    CorruptSessionCart(String),
}

impl From<sqlx::Error> for CartApiError {
    fn from(e: sqlx::Error) -> Self {
        CartApiError::DatabaseError(e.to_string())
    }
}

/// The `CartManagement` trait defines behaviour for storing and mutating shopper carts.
///
/// Every method takes a [`ShopperId`] and dispatches on it: `Customer` carts live in relational cart tables keyed
/// by user id, `Guest` carts live in a session-keyed store as serialized cart lines. Callers never know or care
/// which storage backs the shopper in hand.
#[allow(async_fn_in_trait)]
pub trait CartManagement {
    /// Fetches the cart for the given shopper. An absent cart is an empty one.
    async fn fetch_cart(&self, shopper: &ShopperId) -> Result<Vec<CartLine>, CartApiError>;

    /// Adds `quantity` units of the product to the shopper's cart, creating the cart and line as needed.
    /// If the line already exists, its quantity is increased. Guest lines snapshot the product's name, image and
    /// price as they are at add time; customer lines are joined against the live catalog on every read.
    async fn add_cart_item(&self, shopper: &ShopperId, product_id: i64, quantity: i64) -> Result<(), CartApiError>;

    /// Removes the product's line from the cart entirely, whatever its quantity. Removing an absent line is a no-op.
    async fn remove_cart_item(&self, shopper: &ShopperId, product_id: i64) -> Result<(), CartApiError>;

    /// Increments the line's quantity by one. Incrementing an absent line is a no-op.
    async fn increase_cart_item(&self, shopper: &ShopperId, product_id: i64) -> Result<(), CartApiError>;

    /// Decrements the line's quantity by one, removing the line when it reaches zero.
    async fn decrease_cart_item(&self, shopper: &ShopperId, product_id: i64) -> Result<(), CartApiError>;

    /// Empties the shopper's cart.
    async fn clear_cart(&self, shopper: &ShopperId) -> Result<(), CartApiError>;

    /// Merges the guest session cart into the customer's persisted cart, summing quantities for products present
    /// in both, then clears the session cart in the same transaction. Returns the number of lines merged.
    ///
    /// Clearing inside the transaction is what makes the merge safe to call more than once: a replay sees an
    /// empty session cart and merges nothing.
    async fn merge_session_cart(&self, session_id: &str, user_id: &str) -> Result<usize, CartApiError>;
}
