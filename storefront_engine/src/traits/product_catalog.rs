use crate::{db_types::Product, traits::CheckoutError};

/// Read access to the product table. Writes happen through seed data and operator tooling, not this trait.
#[allow(async_fn_in_trait)]
pub trait ProductCatalog {
    async fn fetch_products(&self) -> Result<Vec<Product>, CheckoutError>;

    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, CheckoutError>;
}
