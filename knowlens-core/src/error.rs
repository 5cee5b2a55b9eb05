//! Error types for knowlens operations
//!
//! The layout cache never fails, so everything here belongs to the
//! extraction side: issuing the start call, draining the message channel,
//! polling index status, and loading configuration.

use thiserror::Error;

/// Main error type for knowlens operations
#[derive(Error, Debug)]
pub enum KnowlensError {
    /// The external start-extraction call was rejected; no session exists
    #[error("Extraction start failed: {0}")]
    StartFailed(String),

    /// The message channel closed before the live session reached a terminal phase
    #[error("Message channel closed before extraction {extraction_id} finished")]
    ChannelClosed { extraction_id: String },

    /// `run` was called with no live session to drive
    #[error("No extraction in progress")]
    NoActiveSession,

    /// Bounded retry gave up
    #[error("Gave up after {attempts} attempts: {context}")]
    RetryExhausted { attempts: u32, context: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Serialization/Deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Generic error with context
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for knowlens operations
pub type Result<T> = std::result::Result<T, KnowlensError>;

impl From<String> for KnowlensError {
    fn from(s: String) -> Self {
        KnowlensError::Other(s)
    }
}

impl From<&str> for KnowlensError {
    fn from(s: &str) -> Self {
        KnowlensError::Other(s.to_string())
    }
}

impl From<serde_json::Error> for KnowlensError {
    fn from(e: serde_json::Error) -> Self {
        KnowlensError::SerializationError(e.to_string())
    }
}
