use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use razorpay_tools::RazorpayApi;
use storefront_engine::{run_migrations, CartApi, CheckoutApi, ReconciliationApi, SqliteDatabase};

use crate::{
    auth::TokenIssuer,
    config::ServerConfig,
    errors::ServerError,
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

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    run_migrations(db.pool()).await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let gateway = RazorpayApi::new(config.razorpay.clone())
        .map_err(|e| ServerError::InitializeError(format!("Could not build gateway client. {e}")))?;
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        let cart_api = CartApi::new(db.clone());
        let checkout_api = CheckoutApi::new(db.clone());
        let reconciliation_api = ReconciliationApi::new(db.clone());
        let jwt_signer = TokenIssuer::new(&config.auth);
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("sfs::access_log"))
            .app_data(web::Data::new(cart_api))
            .app_data(web::Data::new(checkout_api))
            .app_data(web::Data::new(reconciliation_api))
            .app_data(web::Data::new(gateway.clone()))
            .app_data(web::Data::new(config.razorpay.clone()))
            .app_data(web::Data::new(jwt_signer))
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
            .service(PaymentWebhookRoute::<SqliteDatabase>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
