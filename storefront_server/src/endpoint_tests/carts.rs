use actix_web::{http::StatusCode, test, App};
use serde_json::json;
use storefront_engine::db_types::CartLine;

use super::helpers::{configure_app, issue_token, new_test_db};
use crate::auth::SESSION_ID_HEADER;

#[actix_web::test]
async fn cart_requires_some_identity() {
    let (db, _) = new_test_db().await;
    let app = test::init_service(App::new().configure(configure_app(db))).await;
    let req = test::TestRequest::get().uri("/cart").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn guest_cart_round_trip() {
    let (db, products) = new_test_db().await;
    let app = test::init_service(App::new().configure(configure_app(db))).await;

    let req = test::TestRequest::post()
        .uri("/cart/items")
        .insert_header((SESSION_ID_HEADER, "sess-42"))
        .set_json(json!({ "product_id": products[0].id, "quantity": 2 }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/cart").insert_header((SESSION_ID_HEADER, "sess-42")).to_request();
    let lines: Vec<CartLine> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].product_id, products[0].id);
    assert_eq!(lines[0].quantity, 2);

    // a different session sees nothing
    let req = test::TestRequest::get().uri("/cart").insert_header((SESSION_ID_HEADER, "sess-43")).to_request();
    let lines: Vec<CartLine> = test::call_and_read_body_json(&app, req).await;
    assert!(lines.is_empty());
}

#[actix_web::test]
async fn bad_bearer_token_is_rejected() {
    let (db, _) = new_test_db().await;
    let app = test::init_service(App::new().configure(configure_app(db))).await;
    let req = test::TestRequest::get()
        .uri("/cart")
        .insert_header(("Authorization", "Bearer not.a.token"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn login_merge_moves_the_session_cart() {
    let (db, products) = new_test_db().await;
    let app = test::init_service(App::new().configure(configure_app(db))).await;
    let token = issue_token("alice");

    // alice, signed in, already has one tee
    let req = test::TestRequest::post()
        .uri("/cart/items")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(json!({ "product_id": products[0].id }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    // she browses signed out and picks up another tee
    let req = test::TestRequest::post()
        .uri("/cart/items")
        .insert_header((SESSION_ID_HEADER, "sess-alice"))
        .set_json(json!({ "product_id": products[0].id }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    // signing back in merges the session cart into hers
    let req = test::TestRequest::post()
        .uri("/cart/merge")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .insert_header((SESSION_ID_HEADER, "sess-alice"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/cart")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let lines: Vec<CartLine> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 2);

    // the session cart is spent
    let req = test::TestRequest::get().uri("/cart").insert_header((SESSION_ID_HEADER, "sess-alice")).to_request();
    let lines: Vec<CartLine> = test::call_and_read_body_json(&app, req).await;
    assert!(lines.is_empty());
}

#[actix_web::test]
async fn merge_requires_a_signed_in_customer() {
    let (db, _) = new_test_db().await;
    let app = test::init_service(App::new().configure(configure_app(db))).await;
    let req = test::TestRequest::post()
        .uri("/cart/merge")
        .insert_header((SESSION_ID_HEADER, "sess-guest-only"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
