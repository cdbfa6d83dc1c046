use actix_web::{http::StatusCode, test, App};
use razorpay_tools::signature::payment_signature_hex;
use serde_json::json;
use storefront_engine::{db_types::*, CheckoutApi};

use super::helpers::{configure_app, issue_token, new_test_db, TEST_KEY_SECRET};
use crate::data_objects::CheckoutResponse;

fn checkout_body(method: &str) -> serde_json::Value {
    json!({
        "customer_name": "Priya Sharma",
        "email": "priya@example.com",
        "address": "12 MG Road, Bengaluru",
        "payment_method": method,
    })
}

#[actix_web::test]
async fn cod_checkout_places_a_final_order() {
    let (db, products) = new_test_db().await;
    let app = test::init_service(App::new().configure(configure_app(db))).await;
    let token = issue_token("priya");
    let auth = ("Authorization", format!("Bearer {token}"));

    let req = test::TestRequest::post()
        .uri("/cart/items")
        .insert_header(auth.clone())
        .set_json(json!({ "product_id": products[1].id, "quantity": 2 }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/checkout")
        .insert_header(auth.clone())
        .set_json(checkout_body("Cod"))
        .to_request();
    let response: CheckoutResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(response.order.payment_method, PaymentMethod::Cod);
    assert_eq!(response.order.order_status, OrderStatus::Pending);
    assert_eq!(response.order.total_amount, products[1].price * 2);
    assert_eq!(response.items.len(), 1);
    assert!(response.gateway_order_id.is_none());

    let req = test::TestRequest::get().uri("/orders").insert_header(auth.clone()).to_request();
    let orders: Vec<Order> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id, response.order.id);

    let req =
        test::TestRequest::get().uri(&format!("/orders/{}", response.order.id)).insert_header(auth).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn checkout_with_an_empty_cart_is_a_bad_request() {
    let (db, _) = new_test_db().await;
    let app = test::init_service(App::new().configure(configure_app(db))).await;
    let token = issue_token("nobody");
    let req = test::TestRequest::post()
        .uri("/checkout")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(checkout_body("Cod"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn orders_are_not_visible_to_other_shoppers() {
    let (db, products) = new_test_db().await;
    let app = test::init_service(App::new().configure(configure_app(db))).await;
    let token = issue_token("priya");

    let req = test::TestRequest::post()
        .uri("/cart/items")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(json!({ "product_id": products[0].id }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    let req = test::TestRequest::post()
        .uri("/checkout")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(checkout_body("Cod"))
        .to_request();
    let response: CheckoutResponse = test::call_and_read_body_json(&app, req).await;

    let other = issue_token("mallory");
    let req = test::TestRequest::get()
        .uri(&format!("/orders/{}", response.order.id))
        .insert_header(("Authorization", format!("Bearer {other}")))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn verify_endpoint_checks_the_signature() {
    let (db, products) = new_test_db().await;
    let app = test::init_service(App::new().configure(configure_app(db.clone()))).await;
    let token = issue_token("priya");

    let req = test::TestRequest::post()
        .uri("/cart/items")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(json!({ "product_id": products[0].id }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    let req = test::TestRequest::post()
        .uri("/checkout")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(checkout_body("Online"))
        .to_request();
    // The gateway is unreachable in tests, so wire the gateway order id up directly.
    let _ = test::call_service(&app, req).await;
    let engine = CheckoutApi::new(db);
    let orders = engine.orders_for_customer("priya").await.unwrap();
    let order = engine.attach_gateway_order(orders[0].id, "order_rzp_9").await.unwrap();

    // wrong signature: rejected, and nothing recorded
    let req = test::TestRequest::post()
        .uri("/checkout/verify")
        .set_json(json!({
            "gateway_order_id": "order_rzp_9",
            "gateway_payment_id": "pay_55",
            "signature": "deadbeef",
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    assert!(engine.order(order.id).await.unwrap().unwrap().gateway_payment_id.is_none());

    // correct signature: payment id lands, statuses stay Pending
    let signature = payment_signature_hex("order_rzp_9", "pay_55", TEST_KEY_SECRET);
    let req = test::TestRequest::post()
        .uri("/checkout/verify")
        .set_json(json!({
            "gateway_order_id": "order_rzp_9",
            "gateway_payment_id": "pay_55",
            "signature": signature,
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    let order = engine.order(order.id).await.unwrap().unwrap();
    assert_eq!(order.gateway_payment_id.as_deref(), Some("pay_55"));
    assert_eq!(order.order_status, OrderStatus::Pending);
    assert_eq!(order.payment_status, PaymentStatus::Pending);
}
