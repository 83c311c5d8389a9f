use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use craft_market_engine::{db_types::{OrderStatusType, Role}, OrderFlowApi};
use serde_json::json;

use super::{
    helpers::{as_user, send_request},
    mocks::{order_fixture, product_fixture, MockOrderBackend},
};
use crate::routes::{
    ApproveOrderRoute,
    CancelOrderRoute,
    CreateOrderRoute,
    DeliverOrderRoute,
    MyOrdersRoute,
};

const BUYER_ID: i64 = 42;
const ARTISAN_ID: i64 = 7;

#[actix_web::test]
async fn create_order_returns_created() {
    let req = as_user(TestRequest::post().uri("/orders"), BUYER_ID, Role::Buyer)
        .set_json(json!({ "product_id": 11, "quantity": 3 }));
    let (status, body) = send_request(req, |cfg| {
        let mut backend = MockOrderBackend::new();
        backend.expect_fetch_product().returning(|id| Ok(Some(product_fixture(id, ARTISAN_ID))));
        backend.expect_insert_order().returning(|_| Ok(order_fixture(1, OrderStatusType::Open)));
        configure(cfg, backend);
    })
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body.contains(r#""status":"Open""#), "unexpected body: {body}");
}

#[actix_web::test]
async fn my_orders_round_trips_the_engine_records() {
    let req = as_user(TestRequest::get().uri("/orders/my-orders"), BUYER_ID, Role::Buyer);
    let (status, body) = send_request(req, |cfg| {
        let mut backend = MockOrderBackend::new();
        backend
            .expect_fetch_orders_for_buyer()
            .returning(|_| Ok(vec![order_fixture(1, OrderStatusType::Open), order_fixture(2, OrderStatusType::Delivered)]));
        configure(cfg, backend);
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, ORDERS_JSON);
}

#[actix_web::test]
async fn missing_identity_headers_are_unauthorized() {
    let req = TestRequest::get().uri("/orders/my-orders");
    let (status, body) = send_request(req, |cfg| configure(cfg, MockOrderBackend::new())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("cm-user-id header is missing"), "unexpected body: {body}");
}

#[actix_web::test]
async fn approve_is_forbidden_for_non_owner() {
    let req = as_user(TestRequest::put().uri("/orders/1/approve"), ARTISAN_ID, Role::Artisan);
    let (status, body) = send_request(req, |cfg| {
        let mut backend = MockOrderBackend::new();
        backend.expect_fetch_order().returning(|id| Ok(Some(order_fixture(id, OrderStatusType::Open))));
        // Someone else's product.
        backend.expect_fetch_product().returning(|id| Ok(Some(product_fixture(id, 999))));
        configure(cfg, backend);
    })
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("artisan who owns the product"), "unexpected body: {body}");
}

#[actix_web::test]
async fn deliver_from_open_is_a_conflict() {
    let req = as_user(TestRequest::put().uri("/orders/1/deliver"), ARTISAN_ID, Role::Artisan);
    let (status, body) = send_request(req, |cfg| {
        let mut backend = MockOrderBackend::new();
        backend.expect_fetch_order().returning(|id| Ok(Some(order_fixture(id, OrderStatusType::Open))));
        backend.expect_fetch_product().returning(|id| Ok(Some(product_fixture(id, ARTISAN_ID))));
        configure(cfg, backend);
    })
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("cannot move from Open to Delivered"), "unexpected body: {body}");
}

#[actix_web::test]
async fn cancel_route_is_buyer_only() {
    let req = as_user(TestRequest::patch().uri("/orders/1/cancel"), ARTISAN_ID, Role::Artisan);
    let (status, _) = send_request(req, |cfg| configure(cfg, MockOrderBackend::new())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

fn configure(cfg: &mut ServiceConfig, backend: MockOrderBackend) {
    let api = OrderFlowApi::new(backend);
    cfg.service(CreateOrderRoute::<MockOrderBackend>::new())
        .service(MyOrdersRoute::<MockOrderBackend>::new())
        .service(ApproveOrderRoute::<MockOrderBackend>::new())
        .service(DeliverOrderRoute::<MockOrderBackend>::new())
        .service(CancelOrderRoute::<MockOrderBackend>::new())
        .app_data(web::Data::new(api));
}

const ORDERS_JSON: &str = r#"[{"id":1,"product_id":11,"buyer_id":42,"quantity":3,"status":"Open","delivery_date":"2024-03-07T12:00:00Z","artisan_lat":null,"artisan_lng":null,"cancellation_message":null,"version":0,"created_at":"2024-02-29T12:00:00Z","updated_at":"2024-02-29T12:00:00Z"},{"id":2,"product_id":11,"buyer_id":42,"quantity":3,"status":"Delivered","delivery_date":"2024-03-07T12:00:00Z","artisan_lat":null,"artisan_lng":null,"cancellation_message":null,"version":0,"created_at":"2024-02-29T12:00:00Z","updated_at":"2024-02-29T12:00:00Z"}]"#;
