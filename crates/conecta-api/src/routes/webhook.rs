use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use conecta_types::InboundFragment;

use crate::{
    error::{ApiError, ApiResult},
    pipeline,
    routes::channels::parse_channel,
    state::AppState,
};

/// Meta-style subscription handshake parameters.
#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// Normalized inbound payload. Upstream serverless functions translate each
/// provider's envelope into this shape before forwarding.
#[derive(Debug, Deserialize)]
pub struct InboundWebhookRequest {
    pub organization_id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct InboundWebhookResponse {
    pub status: &'static str,
    pub conversation_id: String,
    /// Fragments currently buffered for this conversation.
    pub pending_fragments: usize,
}

/// Webhook verification.
///
/// Meta channels (WhatsApp, Instagram, Messenger) do a GET handshake:
/// echo `hub.challenge` back iff the verify token matches. Telegram has
/// no handshake; a bare 200 is all it wants.
pub async fn verify_webhook(
    State(state): State<AppState>,
    Path(channel): Path<String>,
    Query(query): Query<VerifyQuery>,
) -> ApiResult<String> {
    let channel = parse_channel(&channel)?;

    if !channel.uses_meta_handshake() {
        return Ok("ok".to_string());
    }

    let mode_is_subscribe = query.mode.as_deref() == Some("subscribe");
    let token_matches = query.verify_token.as_deref() == Some(state.config.webhook_verify_token.as_str());

    match (mode_is_subscribe && token_matches, query.challenge) {
        (true, Some(challenge)) => {
            tracing::info!(channel = %channel, "webhook subscription verified");
            Ok(challenge)
        }
        _ => Err(ApiError::VerificationFailed),
    }
}

/// Inbound message fragment.
///
/// Accepted fragments are buffered, not processed inline: the response
/// says only that the fragment joined its conversation's debounce window.
pub async fn receive_webhook(
    State(state): State<AppState>,
    Path(channel): Path<String>,
    Json(req): Json<InboundWebhookRequest>,
) -> ApiResult<(StatusCode, Json<InboundWebhookResponse>)> {
    let channel = parse_channel(&channel)?;

    if req.organization_id.is_empty() {
        return Err(ApiError::BadRequest("organization_id is required".to_string()));
    }
    if req.conversation_id.is_empty() {
        return Err(ApiError::BadRequest("conversation_id is required".to_string()));
    }

    let fragment = InboundFragment::new(channel, req.conversation_id.clone(), req.sender_id, req.text);

    tracing::debug!(
        channel = %channel,
        conversation = %req.conversation_id,
        fragment_id = %fragment.id,
        "fragment received"
    );

    let pending_fragments = pipeline::ingest_fragment(&state, req.organization_id, fragment);

    Ok((
        StatusCode::ACCEPTED,
        Json(InboundWebhookResponse {
            status: "buffered",
            conversation_id: req.conversation_id,
            pending_fragments,
        }),
    ))
}

/// Force a conversation's buffered fragments through without waiting for
/// the quiet window (support/debug surface).
#[derive(Debug, Deserialize)]
pub struct FlushRequest {
    pub organization_id: String,
    pub conversation_id: String,
}

pub async fn flush_webhook(
    State(state): State<AppState>,
    Path(channel): Path<String>,
    Json(req): Json<FlushRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let channel = parse_channel(&channel)?;
    let flushed = pipeline::flush_conversation(&state, &req.organization_id, channel, &req.conversation_id);

    Ok(Json(serde_json::json!({ "flushed": flushed })))
}
