use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use craft_market_engine::{db_types::Role, traits::ProductApiError, ProductApi, ProfileApi};
use serde_json::json;

use super::{
    helpers::{as_user, send_request},
    mocks::{product_fixture, user_fixture, MockOrderBackend},
};
use crate::routes::{AddReviewRoute, UpdateLocationRoute};

const BUYER_ID: i64 = 42;

#[actix_web::test]
async fn update_location_returns_the_profile() {
    let req = as_user(TestRequest::patch().uri("/profile/location"), BUYER_ID, Role::Buyer)
        .set_json(json!({ "location": { "lat": 10.0, "lng": 20.0 } }));
    let (status, body) = send_request(req, |cfg| {
        let mut backend = MockOrderBackend::new();
        backend
            .expect_update_user_location()
            .withf(|user_id, location| *user_id == BUYER_ID && location.lat == 10.0 && location.lng == 20.0)
            .returning(|user_id, _| Ok(user_fixture(user_id, Role::Buyer)));
        configure(cfg, backend, MockOrderBackend::new());
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""latitude":10.0"#), "unexpected body: {body}");
}

#[actix_web::test]
async fn add_review_returns_created() {
    let req = as_user(TestRequest::post().uri("/products/11/review"), BUYER_ID, Role::Buyer)
        .set_json(json!({ "rating": 4, "comment": "Lovely glaze" }));
    let (status, body) = send_request(req, |cfg| {
        let mut backend = MockOrderBackend::new();
        backend.expect_add_review().returning(|r| {
            let mut product = product_fixture(r.product_id, 7);
            product.average_rating = r.rating as f64;
            Ok(product)
        });
        configure(cfg, MockOrderBackend::new(), backend);
    })
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body.contains(r#""success":true"#), "unexpected body: {body}");
}

#[actix_web::test]
async fn duplicate_reviews_are_rejected() {
    let req = as_user(TestRequest::post().uri("/products/11/review"), BUYER_ID, Role::Buyer)
        .set_json(json!({ "rating": 4, "comment": "Lovely glaze" }));
    let (status, body) = send_request(req, |cfg| {
        let mut backend = MockOrderBackend::new();
        backend.expect_add_review().returning(|_| Err(ProductApiError::AlreadyReviewed));
        configure(cfg, MockOrderBackend::new(), backend);
    })
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("already reviewed"), "unexpected body: {body}");
}

#[actix_web::test]
async fn out_of_range_ratings_are_rejected() {
    let req = as_user(TestRequest::post().uri("/products/11/review"), BUYER_ID, Role::Buyer)
        .set_json(json!({ "rating": 6, "comment": "!!" }));
    // Validation fires before any backend call.
    let (status, body) =
        send_request(req, |cfg| configure(cfg, MockOrderBackend::new(), MockOrderBackend::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("between 1 and 5"), "unexpected body: {body}");
}

fn configure(cfg: &mut ServiceConfig, profile_backend: MockOrderBackend, product_backend: MockOrderBackend) {
    cfg.service(UpdateLocationRoute::<MockOrderBackend>::new())
        .service(AddReviewRoute::<MockOrderBackend>::new())
        .app_data(web::Data::new(ProfileApi::new(profile_backend)))
        .app_data(web::Data::new(ProductApi::new(product_backend)));
}
