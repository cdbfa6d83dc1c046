use storefront_common::Paise;

use crate::{db_types::Product, sqlite::db::products, SqliteDatabase};

/// Seeds a small catalog for tests. Prices are in paise; the scarf is nearly out of stock on purpose so stock
/// exhaustion is easy to provoke.
pub async fn seed_products(db: &SqliteDatabase) -> Vec<Product> {
    let mut conn = db.write_pool.acquire().await.expect("Error acquiring connection");
    let specs: [(&str, &str, i64, i64); 3] = [
        ("Classic Tee", "/img/classic-tee.jpg", 49_900, 10),
        ("Denim Jacket", "/img/denim-jacket.jpg", 299_900, 5),
        ("Linen Scarf", "/img/linen-scarf.jpg", 89_900, 2),
    ];
    let mut result = Vec::with_capacity(specs.len());
    for (name, image, price, stock) in specs {
        let product = products::insert_product(name, image, Paise::from(price), stock, &mut conn)
            .await
            .expect("Error seeding product");
        result.push(product);
    }
    result
}
