//! HTTP-level tests for the events API.

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::Service;

fn create_test_app() -> Router {
    let (session, _pool) = common::test_session();
    memobot::create_app(session)
}

async fn post_event(app: &mut Router, event: Value) -> Vec<Value> {
    let request = Request::builder()
        .uri("/events")
        .method("POST")
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(&event).unwrap()))
        .unwrap();

    let response = app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn sent_texts(actions: &[Value]) -> Vec<String> {
    actions
        .iter()
        .filter_map(|action| {
            if action["action"] == "send_message" && action["message"]["type"] == "text" {
                Some(action["message"]["text"].as_str().unwrap().to_string())
            } else {
                None
            }
        })
        .collect()
}

#[tokio::test]
async fn test_start_requests_location() {
    let mut app = create_test_app();

    let actions = post_event(&mut app, json!({"user_id": 1, "text": "/start"})).await;
    assert_eq!(actions.last().unwrap()["action"], "request_location");
}

#[tokio::test]
async fn test_deck_creation_over_http() {
    let mut app = create_test_app();

    post_event(&mut app, json!({"user_id": 1, "text": "/decks"})).await;
    post_event(&mut app, json!({"user_id": 1, "text": "➕ New Deck"})).await;
    let actions = post_event(&mut app, json!({"user_id": 1, "text": "Spanish"})).await;

    let texts = sent_texts(&actions);
    assert!(texts
        .iter()
        .any(|text| text.contains("Deck 'Spanish' has been created!")));

    // The deck details keyboard accompanies the last message.
    assert!(actions.last().unwrap()["keyboard"].is_array());
}

#[tokio::test]
async fn test_location_event_sets_time_zone() {
    let mut app = create_test_app();

    post_event(&mut app, json!({"user_id": 1, "text": "/start"})).await;
    let actions = post_event(
        &mut app,
        json!({"user_id": 1, "location": {"latitude": 52.37, "longitude": 4.89}}),
    )
    .await;

    let texts = sent_texts(&actions);
    assert!(texts.iter().any(|text| text.contains("'UTC' time zone")));
}

#[tokio::test]
async fn test_attachment_becomes_card_content() {
    let mut app = create_test_app();

    post_event(&mut app, json!({"user_id": 1, "text": "/decks"})).await;
    post_event(&mut app, json!({"user_id": 1, "text": "➕ New Deck"})).await;
    post_event(&mut app, json!({"user_id": 1, "text": "Flags"})).await;
    post_event(&mut app, json!({"user_id": 1, "text": "➕ New Card"})).await;
    post_event(
        &mut app,
        json!({
            "user_id": 1,
            "attachment": {"kind": "photo", "file_id": "f1", "caption": "which country?"}
        }),
    )
    .await;
    post_event(&mut app, json!({"user_id": 1, "text": "✏️ Edit Back"})).await;
    post_event(&mut app, json!({"user_id": 1, "text": "France"})).await;
    let actions = post_event(&mut app, json!({"user_id": 1, "text": "💾"})).await;

    let texts = sent_texts(&actions);
    assert!(texts.iter().any(|text| text.contains("Card created")));

    // The deck view that follows shows the photo front.
    assert!(actions
        .iter()
        .any(|action| action["message"]["type"] == "photo"
            && action["message"]["file_id"] == "f1"));
}

#[tokio::test]
async fn test_event_without_content_reprompts() {
    let mut app = create_test_app();

    let actions = post_event(&mut app, json!({"user_id": 1})).await;
    assert!(!actions.is_empty());
}
