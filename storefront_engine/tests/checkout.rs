use storefront_common::Paise;
use storefront_engine::{
    db_types::*,
    test_utils::{
        prepare_env::{prepare_test_env, random_db_path},
        seed::seed_products,
    },
    traits::CheckoutError,
    CartApi,
    CheckoutApi,
    SqliteDatabase,
};

async fn new_store() -> (SqliteDatabase, Vec<Product>) {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new(&url, 5).await.expect("Error creating database");
    let products = seed_products(&db).await;
    (db, products)
}

fn new_order(customer: &ShopperId, method: PaymentMethod) -> NewOrder {
    NewOrder {
        customer_id: customer.customer_key().to_string(),
        customer_name: "Priya Sharma".to_string(),
        email: "priya@example.com".to_string(),
        address: "12 MG Road, Bengaluru".to_string(),
        payment_method: method,
    }
}

#[tokio::test]
async fn checkout_converts_cart_and_decrements_stock() {
    let (db, products) = new_store().await;
    let carts = CartApi::new(db.clone());
    let checkout = CheckoutApi::new(db);
    let shopper = ShopperId::Customer("alice".to_string());

    carts.add_item(&shopper, products[0].id, 2).await.unwrap();
    carts.add_item(&shopper, products[1].id, 1).await.unwrap();

    let (order, items) = checkout.place_order(&shopper, new_order(&shopper, PaymentMethod::Online)).await.unwrap();
    assert_eq!(order.order_status, OrderStatus::Pending);
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert_eq!(order.total_amount, products[0].price * 2 + products[1].price);
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].price, products[0].price);
    assert_eq!(items[0].quantity, 2);

    // stock came down by exactly the ordered quantities
    let tee = checkout.product(products[0].id).await.unwrap().unwrap();
    let jacket = checkout.product(products[1].id).await.unwrap().unwrap();
    assert_eq!(tee.stock_quantity, products[0].stock_quantity - 2);
    assert_eq!(jacket.stock_quantity, products[1].stock_quantity - 1);

    // and the cart is gone
    assert!(carts.cart(&shopper).await.unwrap().is_empty());
}

#[tokio::test]
async fn checkout_of_empty_cart_is_rejected() {
    let (db, _) = new_store().await;
    let checkout = CheckoutApi::new(db);
    let shopper = ShopperId::Customer("bob".to_string());
    let err = checkout.place_order(&shopper, new_order(&shopper, PaymentMethod::Cod)).await.unwrap_err();
    assert!(matches!(err, CheckoutError::EmptyCart));
}

#[tokio::test]
async fn insufficient_stock_rolls_the_whole_checkout_back() {
    let (db, products) = new_store().await;
    let carts = CartApi::new(db.clone());
    let checkout = CheckoutApi::new(db);
    let shopper = ShopperId::Customer("carol".to_string());

    // the scarf is seeded with 2 in stock
    carts.add_item(&shopper, products[0].id, 1).await.unwrap();
    carts.add_item(&shopper, products[2].id, 3).await.unwrap();

    let err = checkout.place_order(&shopper, new_order(&shopper, PaymentMethod::Online)).await.unwrap_err();
    match err {
        CheckoutError::InsufficientStock { product_name, requested, available } => {
            assert_eq!(product_name, "Linen Scarf");
            assert_eq!(requested, 3);
            assert_eq!(available, 2);
        },
        other => panic!("unexpected error: {other}"),
    }

    // nothing moved: no order, no stock change, cart intact
    assert!(checkout.orders_for_customer(shopper.customer_key()).await.unwrap().is_empty());
    let tee = checkout.product(products[0].id).await.unwrap().unwrap();
    assert_eq!(tee.stock_quantity, products[0].stock_quantity);
    assert_eq!(carts.cart(&shopper).await.unwrap().len(), 2);
}

#[tokio::test]
async fn guest_checkout_works_from_the_session_cart() {
    let (db, products) = new_store().await;
    let carts = CartApi::new(db.clone());
    let checkout = CheckoutApi::new(db);
    let guest = ShopperId::Guest("sess-9f2c".to_string());

    carts.add_item(&guest, products[2].id, 1).await.unwrap();
    let (order, items) = checkout.place_order(&guest, new_order(&guest, PaymentMethod::Cod)).await.unwrap();
    assert_eq!(order.customer_id, "sess-9f2c");
    assert_eq!(items.len(), 1);
    assert_eq!(order.total_amount, products[2].price);
    assert!(carts.cart(&guest).await.unwrap().is_empty());
}

#[tokio::test]
async fn order_totals_are_snapshots_in_paise() {
    let (db, products) = new_store().await;
    let carts = CartApi::new(db.clone());
    let checkout = CheckoutApi::new(db);
    let shopper = ShopperId::Customer("dave".to_string());
    carts.add_item(&shopper, products[0].id, 3).await.unwrap();
    let (order, _) = checkout.place_order(&shopper, new_order(&shopper, PaymentMethod::Online)).await.unwrap();
    assert_eq!(order.total_amount, Paise::from(149_700));
}

#[tokio::test]
async fn verify_call_records_the_payment_id_and_nothing_else() {
    let (db, products) = new_store().await;
    let carts = CartApi::new(db.clone());
    let checkout = CheckoutApi::new(db);
    let shopper = ShopperId::Customer("erin".to_string());
    carts.add_item(&shopper, products[0].id, 1).await.unwrap();
    let (order, _) = checkout.place_order(&shopper, new_order(&shopper, PaymentMethod::Online)).await.unwrap();

    checkout.attach_gateway_order(order.id, "order_rzp_77").await.unwrap();
    let order = checkout.record_verified_payment("order_rzp_77", "pay_abc").await.unwrap();
    assert_eq!(order.gateway_payment_id.as_deref(), Some("pay_abc"));
    // the client channel is tentative: statuses do not move
    assert_eq!(order.order_status, OrderStatus::Pending);
    assert_eq!(order.payment_status, PaymentStatus::Pending);

    // an already-recorded payment id is never overwritten
    let order = checkout.record_verified_payment("order_rzp_77", "pay_other").await.unwrap();
    assert_eq!(order.gateway_payment_id.as_deref(), Some("pay_abc"));
}

#[tokio::test]
async fn verify_call_for_unknown_gateway_order_fails() {
    let (db, _) = new_store().await;
    let checkout = CheckoutApi::new(db);
    let err = checkout.record_verified_payment("order_nope", "pay_1").await.unwrap_err();
    assert!(matches!(err, CheckoutError::OrderNotFound(_)));
}
