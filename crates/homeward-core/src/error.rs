//! Error types for Homeward Core

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Missing configuration: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Not authenticated, call authenticate(email, password) first")]
    NotAuthenticated,

    #[error("Tracker location unavailable: {0}")]
    LocationUnavailable(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Tracker API error ({status_code}): {message}")]
    Api { status_code: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Wrap a transport-level failure (connect, timeout, body read).
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Error::Transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
