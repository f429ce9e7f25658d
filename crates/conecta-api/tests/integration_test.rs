use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use conecta_api::config::Config;
use conecta_api::error::ApiError;
use conecta_api::routes::webhook::{self, InboundWebhookRequest, VerifyQuery};
use conecta_api::state::AppState;
use conecta_channels::EchoResponder;
use conecta_persist::StoreClient;

fn test_config() -> Config {
    let toml = r#"
        [server]
        host = "127.0.0.1"
        port = 0

        [cors]
        enabled = false
        origins = []

        [mongodb]
        database = "conecta_test"

        [debounce]
        delay_ms = 60000

        [logging]
        level = "debug"
        format = "pretty"
    "#;

    let mut config: Config = toml::from_str(toml).unwrap();
    config.mongodb_uri = "mongodb://localhost:27017".to_string();
    config.webhook_verify_token = "test-verify-token".to_string();
    config
}

/// The mongodb driver connects lazily, so state construction needs no
/// running database; only handlers that actually query it would.
async fn test_state() -> AppState {
    let config = test_config();
    let store = StoreClient::new(&config.mongodb_uri, &config.mongodb.database)
        .await
        .unwrap();
    AppState::new(config, store, Arc::new(EchoResponder::new()))
}

#[tokio::test]
async fn test_api_error_responses() {
    let response = ApiError::BadRequest("Test error".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = ApiError::VerificationFailed.into_response();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = ApiError::UnknownChannel("sms".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_meta_handshake_echoes_challenge_on_valid_token() {
    let state = test_state().await;

    let challenge = webhook::verify_webhook(
        State(state),
        Path("whatsapp".to_string()),
        Query(VerifyQuery {
            mode: Some("subscribe".to_string()),
            verify_token: Some("test-verify-token".to_string()),
            challenge: Some("challenge-42".to_string()),
        }),
    )
    .await
    .unwrap();

    assert_eq!(challenge, "challenge-42");
}

#[tokio::test]
async fn test_meta_handshake_rejects_bad_token() {
    let state = test_state().await;

    let result = webhook::verify_webhook(
        State(state),
        Path("messenger".to_string()),
        Query(VerifyQuery {
            mode: Some("subscribe".to_string()),
            verify_token: Some("wrong".to_string()),
            challenge: Some("challenge-42".to_string()),
        }),
    )
    .await;

    assert!(matches!(result, Err(ApiError::VerificationFailed)));
}

#[tokio::test]
async fn test_telegram_has_no_handshake() {
    let state = test_state().await;

    let body = webhook::verify_webhook(
        State(state),
        Path("telegram".to_string()),
        Query(VerifyQuery {
            mode: None,
            verify_token: None,
            challenge: None,
        }),
    )
    .await
    .unwrap();

    assert_eq!(body, "ok");
}

#[tokio::test]
async fn test_inbound_fragments_are_buffered_not_processed() {
    let state = test_state().await;

    let (status, Json(first)) = webhook::receive_webhook(
        State(state.clone()),
        Path("whatsapp".to_string()),
        Json(InboundWebhookRequest {
            organization_id: "org-1".to_string(),
            conversation_id: "conv-1".to_string(),
            sender_id: "user-1".to_string(),
            text: "Hello".to_string(),
        }),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(first.status, "buffered");
    assert_eq!(first.pending_fragments, 1);

    let (_, Json(second)) = webhook::receive_webhook(
        State(state),
        Path("whatsapp".to_string()),
        Json(InboundWebhookRequest {
            organization_id: "org-1".to_string(),
            conversation_id: "conv-1".to_string(),
            sender_id: "user-1".to_string(),
            text: "world".to_string(),
        }),
    )
    .await
    .unwrap();

    assert_eq!(second.pending_fragments, 2);
}

#[tokio::test]
async fn test_unknown_channel_is_rejected() {
    let state = test_state().await;

    let result = webhook::receive_webhook(
        State(state),
        Path("sms".to_string()),
        Json(InboundWebhookRequest {
            organization_id: "org-1".to_string(),
            conversation_id: "conv-1".to_string(),
            sender_id: "user-1".to_string(),
            text: "Hello".to_string(),
        }),
    )
    .await;

    assert!(matches!(result, Err(ApiError::UnknownChannel(_))));
}
