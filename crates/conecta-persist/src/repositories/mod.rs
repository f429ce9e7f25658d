mod connection;

pub use connection::ConnectionRepository;
