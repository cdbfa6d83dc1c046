use actix_web::web::{self, ServiceConfig};
use chrono::Duration;
use razorpay_tools::{RazorpayApi, RazorpayConfig};
use storefront_common::Secret;
use storefront_engine::{
    db_types::Product,
    test_utils::{
        prepare_env::{prepare_test_env, random_db_path},
        seed::seed_products,
    },
    CartApi,
    CheckoutApi,
    ReconciliationApi,
    SqliteDatabase,
};

use crate::{
    auth::TokenIssuer,
    config::AuthConfig,
    routes::{
        health,
        AddCartItemRoute,
        CheckoutRoute,
        ClearCartRoute,
        DecreaseCartItemRoute,
        IncreaseCartItemRoute,
        MergeCartRoute,
        MyCartRoute,
        MyOrdersRoute,
        OrderByIdRoute,
        ProductByIdRoute,
        ProductsRoute,
        RemoveCartItemRoute,
        VerifyPaymentRoute,
    },
    webhook_routes::PaymentWebhookRoute,
};

pub const TEST_KEY_SECRET: &str = "test_key_secret";
pub const TEST_WEBHOOK_SECRET: &str = "test_webhook_secret";

pub async fn new_test_db() -> (SqliteDatabase, Vec<Product>) {
    let _ = env_logger::try_init().ok();
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new(&url, 5).await.expect("Error creating database");
    let products = seed_products(&db).await;
    (db, products)
}

pub fn test_auth_config() -> AuthConfig {
    AuthConfig { jwt_secret: Secret::new("0123456789abcdef0123456789abcdef".to_string()) }
}

pub fn test_razorpay_config() -> RazorpayConfig {
    RazorpayConfig {
        host: "gateway.invalid".to_string(),
        key_id: "rzp_test_key".to_string(),
        key_secret: Secret::new(TEST_KEY_SECRET.to_string()),
        webhook_secret: Secret::new(TEST_WEBHOOK_SECRET.to_string()),
    }
}

pub fn issue_token(user_id: &str) -> String {
    TokenIssuer::new(&test_auth_config()).issue_token(user_id, Duration::hours(1)).expect("Error issuing token")
}

/// Wires up the full route table against the given database, the same shape `create_server_instance` builds.
pub fn configure_app(db: SqliteDatabase) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let gateway = RazorpayApi::new(test_razorpay_config()).expect("Error building gateway client");
        cfg.app_data(web::Data::new(CartApi::new(db.clone())))
            .app_data(web::Data::new(CheckoutApi::new(db.clone())))
            .app_data(web::Data::new(ReconciliationApi::new(db.clone())))
            .app_data(web::Data::new(gateway))
            .app_data(web::Data::new(test_razorpay_config()))
            .app_data(web::Data::new(TokenIssuer::new(&test_auth_config())))
            .service(health)
            .service(ProductsRoute::<SqliteDatabase>::new())
            .service(ProductByIdRoute::<SqliteDatabase>::new())
            .service(MyCartRoute::<SqliteDatabase>::new())
            .service(AddCartItemRoute::<SqliteDatabase>::new())
            .service(RemoveCartItemRoute::<SqliteDatabase>::new())
            .service(IncreaseCartItemRoute::<SqliteDatabase>::new())
            .service(DecreaseCartItemRoute::<SqliteDatabase>::new())
            .service(ClearCartRoute::<SqliteDatabase>::new())
            .service(MergeCartRoute::<SqliteDatabase>::new())
            .service(CheckoutRoute::<SqliteDatabase>::new())
            .service(VerifyPaymentRoute::<SqliteDatabase>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(PaymentWebhookRoute::<SqliteDatabase>::new());
    }
}
