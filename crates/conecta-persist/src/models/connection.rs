use chrono::{DateTime, Utc};
use conecta_types::{ChannelCredentials, ChannelKind};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A messaging-channel account an organization has connected.
///
/// One document per (organization, channel); reconnecting replaces the
/// stored credentials rather than accumulating documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConnection {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub organization_id: String,
    pub channel: ChannelKind,
    pub credentials: ChannelCredentials,
    pub status: ConnectionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChannelConnection {
    pub fn new(
        organization_id: impl Into<String>,
        channel: ChannelKind,
        credentials: ChannelCredentials,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            organization_id: organization_id.into(),
            channel,
            credentials,
            status: ConnectionStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// Credentials stored, webhook subscription not yet verified.
    Pending,
    Connected,
    Disconnected,
    Error,
}
