use log::*;

use crate::{
    db_types::{CartLine, ShopperId},
    traits::{CartApiError, CartManagement},
};

/// Cart operations for the hybrid cart model.
///
/// Callers hold a [`ShopperId`] and nothing else; whether the lines live in a session store or relational tables
/// is the backend's business.
#[derive(Debug, Clone)]
pub struct CartApi<B> {
    db: B,
}

impl<B: CartManagement> CartApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn cart(&self, shopper: &ShopperId) -> Result<Vec<CartLine>, CartApiError> {
        self.db.fetch_cart(shopper).await
    }

    pub async fn add_item(&self, shopper: &ShopperId, product_id: i64, quantity: i64) -> Result<(), CartApiError> {
        self.db.add_cart_item(shopper, product_id, quantity).await
    }

    pub async fn remove_item(&self, shopper: &ShopperId, product_id: i64) -> Result<(), CartApiError> {
        self.db.remove_cart_item(shopper, product_id).await
    }

    pub async fn increase_item(&self, shopper: &ShopperId, product_id: i64) -> Result<(), CartApiError> {
        self.db.increase_cart_item(shopper, product_id).await
    }

    pub async fn decrease_item(&self, shopper: &ShopperId, product_id: i64) -> Result<(), CartApiError> {
        self.db.decrease_cart_item(shopper, product_id).await
    }

    pub async fn clear(&self, shopper: &ShopperId) -> Result<(), CartApiError> {
        self.db.clear_cart(shopper).await
    }

    /// The one-way merge that runs when a guest signs in: session cart lines are folded into the customer cart,
    /// summing quantities, and the session cart is emptied. Calling it again for the same session is a no-op.
    pub async fn merge_on_login(&self, session_id: &str, user_id: &str) -> Result<usize, CartApiError> {
        let merged = self.db.merge_session_cart(session_id, user_id).await?;
        if merged > 0 {
            info!("🛒 Login merge moved {merged} line(s) from session [{session_id}] to customer [{user_id}]");
        }
        Ok(merged)
    }
}
