//! Error types for the track ingress daemon

use crate::protocol::DecodeError;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Track ingress error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error (socket bind/connect/send, config file access)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be parsed or failed validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// Datagram could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Operation requires a connected link
    #[error("Link not connected")]
    NotConnected,

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Outbound serialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
