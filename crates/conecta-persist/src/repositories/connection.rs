use chrono::Utc;
use conecta_types::{ChannelCredentials, ChannelKind};
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::{Client, Collection};

use crate::error::Result;
use crate::models::{ChannelConnection, ConnectionStatus};

#[derive(Clone)]
pub struct ConnectionRepository {
    collection: Collection<ChannelConnection>,
}

impl ConnectionRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("channel_connections");
        Self { collection }
    }

    fn channel_filter(organization_id: &str, channel: ChannelKind) -> Result<mongodb::bson::Document> {
        Ok(doc! {
            "organization_id": organization_id,
            "channel": bson::to_bson(&channel)?,
        })
    }

    /// Store credentials for (organization, channel), replacing any
    /// previous connection for the pair. Reconnecting resets the status
    /// to pending until the webhook handshake verifies again.
    pub async fn upsert_connection(
        &self,
        organization_id: &str,
        channel: ChannelKind,
        credentials: ChannelCredentials,
    ) -> Result<ChannelConnection> {
        let filter = Self::channel_filter(organization_id, channel)?;

        match self.collection.find_one(filter.clone()).await? {
            Some(mut existing) => {
                existing.credentials = credentials;
                existing.status = ConnectionStatus::Pending;
                existing.updated_at = Utc::now();

                // Dates go through serde so updates match what insert_one wrote.
                let update = doc! { "$set": {
                    "credentials": bson::to_bson(&existing.credentials)?,
                    "status": bson::to_bson(&existing.status)?,
                    "updated_at": bson::to_bson(&existing.updated_at)?,
                }};
                self.collection.update_one(filter, update).await?;
                Ok(existing)
            }
            None => {
                let connection = ChannelConnection::new(organization_id, channel, credentials);
                self.collection.insert_one(&connection).await?;
                Ok(connection)
            }
        }
    }

    /// Get the connection for (organization, channel), if any.
    pub async fn get_connection(
        &self,
        organization_id: &str,
        channel: ChannelKind,
    ) -> Result<Option<ChannelConnection>> {
        let filter = Self::channel_filter(organization_id, channel)?;
        Ok(self.collection.find_one(filter).await?)
    }

    /// List every channel an organization has connected.
    pub async fn list_connections(&self, organization_id: &str) -> Result<Vec<ChannelConnection>> {
        let filter = doc! { "organization_id": organization_id };
        let connections = self
            .collection
            .find(filter)
            .sort(doc! { "created_at": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(connections)
    }

    /// Update connection status; returns false if no such connection.
    pub async fn update_status(
        &self,
        organization_id: &str,
        channel: ChannelKind,
        status: ConnectionStatus,
    ) -> Result<bool> {
        let filter = Self::channel_filter(organization_id, channel)?;
        let update = doc! { "$set": {
            "status": bson::to_bson(&status)?,
            "updated_at": bson::to_bson(&Utc::now())?,
        }};

        let result = self.collection.update_one(filter, update).await?;
        Ok(result.matched_count > 0)
    }

    /// Remove a connection; returns false if nothing was stored.
    pub async fn delete_connection(
        &self,
        organization_id: &str,
        channel: ChannelKind,
    ) -> Result<bool> {
        let filter = Self::channel_filter(organization_id, channel)?;
        let result = self.collection.delete_one(filter).await?;
        Ok(result.deleted_count > 0)
    }
}
