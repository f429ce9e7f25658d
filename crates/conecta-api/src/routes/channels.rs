use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use conecta_persist::{ChannelConnection, ConnectionStatus};
use conecta_types::{ChannelCredentials, ChannelKind};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ConnectChannelRequest {
    pub organization_id: String,
    pub channel: ChannelKind,
    pub credentials: ChannelCredentials,
}

/// Stored connection, minus the credentials; tokens never leave the API.
#[derive(Debug, Serialize)]
pub struct ConnectionResponse {
    pub id: String,
    pub organization_id: String,
    pub channel: ChannelKind,
    pub status: ConnectionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize)]
pub struct OrganizationQuery {
    pub organization_id: String,
}

#[derive(Debug, Serialize)]
pub struct ListConnectionsResponse {
    pub connections: Vec<ConnectionResponse>,
}

/// Store credentials for a channel. Re-posting for the same channel
/// replaces the stored credentials and resets the status to pending.
pub async fn connect_channel(
    State(state): State<AppState>,
    Json(req): Json<ConnectChannelRequest>,
) -> ApiResult<(StatusCode, Json<ConnectionResponse>)> {
    if req.organization_id.is_empty() {
        return Err(ApiError::BadRequest("organization_id is required".to_string()));
    }
    if req.credentials.access_token.is_empty() {
        return Err(ApiError::BadRequest("access_token is required".to_string()));
    }

    let connection = state
        .store
        .connections()
        .upsert_connection(&req.organization_id, req.channel, req.credentials)
        .await?;

    Ok((StatusCode::CREATED, Json(connection_to_response(connection))))
}

/// List every channel an organization has connected.
pub async fn list_channels(
    State(state): State<AppState>,
    Query(query): Query<OrganizationQuery>,
) -> ApiResult<Json<ListConnectionsResponse>> {
    let connections = state
        .store
        .connections()
        .list_connections(&query.organization_id)
        .await?;

    Ok(Json(ListConnectionsResponse {
        connections: connections.into_iter().map(connection_to_response).collect(),
    }))
}

/// Disconnect a channel, discarding its stored credentials.
pub async fn disconnect_channel(
    State(state): State<AppState>,
    Path(channel): Path<String>,
    Query(query): Query<OrganizationQuery>,
) -> ApiResult<StatusCode> {
    let channel = parse_channel(&channel)?;

    let deleted = state
        .store
        .connections()
        .delete_connection(&query.organization_id, channel)
        .await?;

    if !deleted {
        return Err(ApiError::ChannelNotConnected(channel.to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

pub(crate) fn parse_channel(raw: &str) -> Result<ChannelKind, ApiError> {
    ChannelKind::from_str(raw).map_err(|_| ApiError::UnknownChannel(raw.to_string()))
}

fn connection_to_response(connection: ChannelConnection) -> ConnectionResponse {
    ConnectionResponse {
        id: connection.id.to_hex(),
        organization_id: connection.organization_id,
        channel: connection.channel,
        status: connection.status,
        account_id: connection.credentials.account_id,
        created_at: connection.created_at,
        updated_at: connection.updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_never_exposes_tokens() {
        let connection = ChannelConnection::new(
            "org-1",
            ChannelKind::Whatsapp,
            ChannelCredentials::new("secret-token").with_account_id("15551234567"),
        );
        let json = serde_json::to_string(&connection_to_response(connection)).unwrap();
        assert!(!json.contains("secret-token"));
        assert!(json.contains("15551234567"));
    }

    #[test]
    fn test_parse_channel_rejects_unknown() {
        assert!(parse_channel("whatsapp").is_ok());
        assert!(parse_channel("sms").is_err());
    }
}
