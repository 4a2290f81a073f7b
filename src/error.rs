//! Error types for textchat.

use thiserror::Error;

/// Common error type for textchat.
#[derive(Error, Debug)]
pub enum ChatError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Validation error for configuration values or user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// A frame could not be decoded or encoded.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// A frame exceeded the configured size limit.
    #[error("frame exceeds {limit} bytes")]
    FrameTooLarge {
        /// The limit that was exceeded.
        limit: usize,
    },

    /// The peer closed the connection in the middle of an exchange.
    #[error("connection closed by peer")]
    ConnectionClosed,

    /// No input arrived within the configured time.
    #[error("timed out after {0}s")]
    Timeout(u64),

    /// The server answered with an error response.
    #[error("server error: {0}")]
    Server(String),

    /// The server answered with a response of the wrong kind.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl From<serde_json::Error> for ChatError {
    fn from(e: serde_json::Error) -> Self {
        ChatError::Protocol(e.to_string())
    }
}

/// Result type alias for textchat operations.
pub type Result<T> = std::result::Result<T, ChatError>;
