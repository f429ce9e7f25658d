use mongodb::Client;

use crate::error::{Result, StoreError};
use crate::repositories::ConnectionRepository;

/// Entry point to the channel-connection store.
pub struct StoreClient {
    connection_repo: ConnectionRepository,
}

impl StoreClient {
    pub async fn new(mongodb_uri: &str, db_name: &str) -> Result<Self> {
        let client = Client::with_uri_str(mongodb_uri)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let connection_repo = ConnectionRepository::new(&client, db_name);

        tracing::debug!(database = db_name, "channel store connected");

        Ok(Self { connection_repo })
    }

    pub fn builder() -> crate::builder::StoreClientBuilder {
        crate::builder::StoreClientBuilder::new()
    }

    pub fn connections(&self) -> &ConnectionRepository {
        &self.connection_repo
    }
}
