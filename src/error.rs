//! Error types for framegrab.

use std::time::Duration;

use thiserror::Error;

/// Main error type for all framegrab operations.
#[derive(Debug, Error)]
pub enum FramegrabError {
    /// Could not open the TCP connection (unreachable, refused, bad host).
    #[error("Failed to connect to {endpoint}")]
    Connect {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },

    /// Stream closed before the 4-byte length prefix was complete.
    #[error("Stream closed after {received} of 4 length prefix bytes")]
    ShortHeader { received: usize },

    /// Stream closed before the declared payload length was reached.
    ///
    /// Only raised under [`TruncationPolicy::Reject`](crate::receiver::TruncationPolicy).
    #[error("Frame incomplete: expected {expected} bytes, received {received}")]
    IncompleteFrame { expected: u32, received: usize },

    /// Declared payload length exceeds the configured maximum.
    #[error("Payload size {declared} exceeds maximum {max}")]
    PayloadTooLarge { declared: u32, max: u32 },

    /// The whole receive did not finish within the configured timeout.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// I/O error while reading from the connection.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing the payload to its destination failed.
    #[error("Failed to write frame to {target}")]
    Sink {
        target: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration value.
    #[error("Config error: {0}")]
    Config(String),

    /// JSON config file could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FramegrabError {
    /// True for errors caused by the peer's framing rather than I/O or setup.
    pub fn is_framing(&self) -> bool {
        matches!(
            self,
            FramegrabError::ShortHeader { .. }
                | FramegrabError::IncompleteFrame { .. }
                | FramegrabError::PayloadTooLarge { .. }
        )
    }
}

/// Result type alias using FramegrabError.
pub type Result<T> = std::result::Result<T, FramegrabError>;
