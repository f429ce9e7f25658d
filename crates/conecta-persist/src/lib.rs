pub mod builder;
pub mod client;
pub mod error;
pub mod models;
pub mod repositories;

pub use builder::StoreClientBuilder;
pub use client::StoreClient;
pub use error::StoreError;
pub use models::{ChannelConnection, ConnectionStatus};
pub use repositories::ConnectionRepository;
