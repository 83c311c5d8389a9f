use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use craft_market_engine::{db_types::Role, traits::ConversationEntry, ChatApi};
use serde_json::json;

use super::{
    helpers::{as_user, send_request},
    mocks::{conversation_fixture, message_fixture, MockChatBackend},
};
use crate::routes::{MarkReadRoute, SendMessageRoute, UnreadCountRoute};

const BUYER_ID: i64 = 42;
const ARTISAN_ID: i64 = 7;

#[actix_web::test]
async fn send_message_returns_created() {
    let req = as_user(TestRequest::post().uri("/messages"), BUYER_ID, Role::Buyer)
        .set_json(json!({ "conversation_id": 5, "content": "Hi" }));
    let (status, body) = send_request(req, |cfg| {
        let mut backend = MockChatBackend::new();
        backend.expect_fetch_conversation().returning(|id| Ok(Some(conversation_fixture(id, BUYER_ID, ARTISAN_ID))));
        backend.expect_insert_message().returning(|m| Ok(message_fixture(1, m.conversation_id, m.sender_id, m.sender_role)));
        configure(cfg, backend);
    })
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body.contains(r#""content":"Hi""#), "unexpected body: {body}");
    assert!(body.contains(r#""sender_role":"Buyer""#), "unexpected body: {body}");
}

#[actix_web::test]
async fn send_message_by_outsider_is_forbidden() {
    let req = as_user(TestRequest::post().uri("/messages"), 1000, Role::Buyer)
        .set_json(json!({ "conversation_id": 5, "content": "Hi" }));
    let (status, body) = send_request(req, |cfg| {
        let mut backend = MockChatBackend::new();
        backend.expect_fetch_conversation().returning(|id| Ok(Some(conversation_fixture(id, BUYER_ID, ARTISAN_ID))));
        configure(cfg, backend);
    })
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("not a participant"), "unexpected body: {body}");
}

#[actix_web::test]
async fn blank_messages_are_rejected() {
    let req = as_user(TestRequest::post().uri("/messages"), BUYER_ID, Role::Buyer)
        .set_json(json!({ "conversation_id": 5, "content": "   " }));
    // The content check fires before any backend call, so no expectations are needed.
    let (status, body) = send_request(req, |cfg| configure(cfg, MockChatBackend::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Message content is required"), "unexpected body: {body}");
}

#[actix_web::test]
async fn unread_count_is_a_conversation_count() {
    let req = as_user(TestRequest::get().uri("/conversations/unread-count"), ARTISAN_ID, Role::Artisan);
    let (status, body) = send_request(req, |cfg| {
        let mut backend = MockChatBackend::new();
        backend.expect_fetch_conversations_for_user().returning(|_| {
            let mut caught_up = conversation_fixture(1, BUYER_ID, ARTISAN_ID);
            caught_up.last_message_id = Some(9);
            let mut unread = conversation_fixture(2, 43, ARTISAN_ID);
            unread.last_message_id = Some(12);
            Ok(vec![
                ConversationEntry { conversation: caught_up, last_read_message_id: Some(9) },
                ConversationEntry { conversation: unread, last_read_message_id: None },
            ])
        });
        configure(cfg, backend);
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"unread_count":1}"#);
}

#[actix_web::test]
async fn mark_read_stamps_the_latest_message() {
    let req = as_user(TestRequest::patch().uri("/conversations/5/read"), ARTISAN_ID, Role::Artisan);
    let (status, body) = send_request(req, |cfg| {
        let mut backend = MockChatBackend::new();
        backend.expect_fetch_conversation().returning(|id| Ok(Some(conversation_fixture(id, BUYER_ID, ARTISAN_ID))));
        backend.expect_fetch_latest_message().returning(|id| Ok(Some(message_fixture(17, id, BUYER_ID, Role::Buyer))));
        backend
            .expect_mark_read()
            .withf(|conversation_id, user_id, message_id| *conversation_id == 5 && *user_id == ARTISAN_ID && *message_id == 17)
            .returning(|_, _, _| Ok(()));
        configure(cfg, backend);
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""success":true"#), "unexpected body: {body}");
}

fn configure(cfg: &mut ServiceConfig, backend: MockChatBackend) {
    let api = ChatApi::new(backend);
    cfg.service(SendMessageRoute::<MockChatBackend>::new())
        .service(UnreadCountRoute::<MockChatBackend>::new())
        .service(MarkReadRoute::<MockChatBackend>::new())
        .app_data(web::Data::new(api));
}
