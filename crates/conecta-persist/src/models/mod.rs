mod connection;

pub use connection::{ChannelConnection, ConnectionStatus};
