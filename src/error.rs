//! Error types for tshot

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for tshot operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving configuration or querying the model
#[derive(Error, Debug)]
pub enum Error {
    #[error("Config not found at {path:?}")]
    ConfigNotFound { path: PathBuf },

    #[error("Configuration error: {0}")]
    ConfigParse(String),

    #[error("genai config cannot be empty: api key is missing")]
    EmptyCredential,

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Error sending message: {0}")]
    Remote(String),

    #[error("No response from model")]
    EmptyResponse,

    #[error("Request cancelled")]
    Cancelled,

    #[error("Session already closed")]
    SessionClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Process exit status for this error kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::ConfigNotFound { .. } => 2,
            Error::ConfigParse(_) => 3,
            Error::EmptyCredential => 4,
            Error::InvalidQuery(_) => 5,
            Error::Connection(_) => 6,
            Error::Remote(_) => 7,
            Error::EmptyResponse => 8,
            Error::Cancelled => 130,
            Error::SessionClosed | Error::Io(_) => 1,
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::ConfigParse(err.to_string())
    }
}
