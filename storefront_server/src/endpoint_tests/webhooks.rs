use actix_web::{http::StatusCode, test, App};
use razorpay_tools::signature::{webhook_signature_base64, webhook_signature_hex};
use serde_json::json;
use storefront_engine::{db_types::*, CartApi, CheckoutApi, ReconciliationApi, SqliteDatabase};

use super::helpers::{configure_app, new_test_db, TEST_WEBHOOK_SECRET};
use crate::{data_objects::JsonResponse, webhook_routes::WEBHOOK_SIGNATURE_HEADER};

/// Seeds an online order wired to gateway order `order_rzp_1`.
async fn pending_online_order(db: &SqliteDatabase, product: &Product) -> Order {
    let carts = CartApi::new(db.clone());
    let checkout = CheckoutApi::new(db.clone());
    let shopper = ShopperId::Customer("priya".to_string());
    carts.add_item(&shopper, product.id, 1).await.unwrap();
    let (order, _) = checkout
        .place_order(&shopper, NewOrder {
            customer_id: "priya".to_string(),
            customer_name: "Priya Sharma".to_string(),
            email: "priya@example.com".to_string(),
            address: "12 MG Road, Bengaluru".to_string(),
            payment_method: PaymentMethod::Online,
        })
        .await
        .unwrap();
    checkout.attach_gateway_order(order.id, "order_rzp_1").await.unwrap()
}

fn captured_body(payment_id: &str) -> Vec<u8> {
    json!({
        "event": "payment.captured",
        "payload": { "payment": { "entity": { "id": payment_id, "order_id": "order_rzp_1", "amount": 49900 } } }
    })
    .to_string()
    .into_bytes()
}

#[actix_web::test]
async fn signed_delivery_is_processed_and_approves_the_order() {
    let (db, products) = new_test_db().await;
    let order = pending_online_order(&db, &products[0]).await;
    let app = test::init_service(App::new().configure(configure_app(db.clone()))).await;

    let body = captured_body("pay_1");
    let req = test::TestRequest::post()
        .uri("/payments/webhook")
        .insert_header((WEBHOOK_SIGNATURE_HEADER, webhook_signature_hex(&body, TEST_WEBHOOK_SECRET)))
        .set_payload(body)
        .to_request();
    let response: JsonResponse = test::call_and_read_body_json(&app, req).await;
    assert!(response.success);
    assert_eq!(response.message, "PaymentCaptured");

    let order = CheckoutApi::new(db).order(order.id).await.unwrap().unwrap();
    assert_eq!(order.order_status, OrderStatus::Approved);
    assert_eq!(order.payment_status, PaymentStatus::Captured);
    assert_eq!(order.gateway_payment_id.as_deref(), Some("pay_1"));
}

#[actix_web::test]
async fn base64_signatures_are_accepted_too() {
    let (db, products) = new_test_db().await;
    pending_online_order(&db, &products[0]).await;
    let app = test::init_service(App::new().configure(configure_app(db))).await;

    let body = captured_body("pay_2");
    let req = test::TestRequest::post()
        .uri("/payments/webhook")
        .insert_header((WEBHOOK_SIGNATURE_HEADER, webhook_signature_base64(&body, TEST_WEBHOOK_SECRET)))
        .set_payload(body)
        .to_request();
    let response: JsonResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(response.message, "PaymentCaptured");
}

#[actix_web::test]
async fn replayed_deliveries_are_acknowledged_without_effect() {
    let (db, products) = new_test_db().await;
    pending_online_order(&db, &products[0]).await;
    let app = test::init_service(App::new().configure(configure_app(db))).await;

    let body = captured_body("pay_3");
    let signature = webhook_signature_hex(&body, TEST_WEBHOOK_SECRET);
    for expected in ["PaymentCaptured", "AlreadyProcessed:pay_3"] {
        let req = test::TestRequest::post()
            .uri("/payments/webhook")
            .insert_header((WEBHOOK_SIGNATURE_HEADER, signature.clone()))
            .set_payload(body.clone())
            .to_request();
        let response: JsonResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(response.message, expected);
    }
}

#[actix_web::test]
async fn unsigned_delivery_is_rejected_but_still_audited() {
    let (db, products) = new_test_db().await;
    let order = pending_online_order(&db, &products[0]).await;
    let app = test::init_service(App::new().configure(configure_app(db.clone()))).await;

    let body = captured_body("pay_4");
    let req = test::TestRequest::post()
        .uri("/payments/webhook")
        .insert_header((WEBHOOK_SIGNATURE_HEADER, "forged"))
        .set_payload(body.clone())
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // the delivery is in the ledger, closed as rejected, and the order did not move
    let api = ReconciliationApi::new(db.clone());
    let log = api.webhook_log(1).await.unwrap().unwrap();
    assert!(log.processed);
    assert_eq!(log.processing_result.as_deref(), Some("InvalidSignature"));
    assert_eq!(log.payload, body);
    let order = CheckoutApi::new(db).order(order.id).await.unwrap().unwrap();
    assert_eq!(order.order_status, OrderStatus::Pending);
}

#[actix_web::test]
async fn every_event_kind_is_rejected_when_the_body_is_tampered_with() {
    let (db, products) = new_test_db().await;
    let order = pending_online_order(&db, &products[0]).await;
    let app = test::init_service(App::new().configure(configure_app(db.clone()))).await;

    let bodies = [
        captured_body("pay_7"),
        json!({
            "event": "payment.failed",
            "payload": { "payment": { "entity": { "id": "pay_7", "order_id": "order_rzp_1" } } }
        })
        .to_string()
        .into_bytes(),
        json!({ "event": "order.paid", "payload": { "order": { "entity": { "id": "order_rzp_1" } } } })
            .to_string()
            .into_bytes(),
        json!({
            "event": "refund.processed",
            "payload": { "refund": { "entity": { "id": "rfnd_1", "payment_id": "pay_7" } } }
        })
        .to_string()
        .into_bytes(),
        json!({ "event": "invoice.generated", "payload": {} }).to_string().into_bytes(),
    ];
    for body in bodies {
        // sign the genuine body, then flip a byte of the payload
        let signature = webhook_signature_hex(&body, TEST_WEBHOOK_SECRET);
        let mut tampered = body.clone();
        let last = tampered.len() - 2;
        tampered[last] ^= 0x01;
        let req = test::TestRequest::post()
            .uri("/payments/webhook")
            .insert_header((WEBHOOK_SIGNATURE_HEADER, signature))
            .set_payload(tampered)
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "event was: {}", String::from_utf8_lossy(&body));
    }

    // none of the rejected deliveries moved the order
    let order = CheckoutApi::new(db).order(order.id).await.unwrap().unwrap();
    assert_eq!(order.order_status, OrderStatus::Pending);
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert!(order.gateway_payment_id.is_none());
}

#[actix_web::test]
async fn unknown_events_get_a_200_and_an_ignored_result() {
    let (db, _) = new_test_db().await;
    let app = test::init_service(App::new().configure(configure_app(db))).await;
    let body = json!({ "event": "invoice.generated", "payload": {} }).to_string().into_bytes();
    let req = test::TestRequest::post()
        .uri("/payments/webhook")
        .insert_header((WEBHOOK_SIGNATURE_HEADER, webhook_signature_hex(&body, TEST_WEBHOOK_SECRET)))
        .set_payload(body)
        .to_request();
    let response: JsonResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(response.message, "Ignored:invoice.generated");
}
