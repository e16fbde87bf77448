//! Client error types.

use thiserror::Error;

/// Errors that can occur when talking to the quiz server.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// The server could not be reached.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with an error status.
    #[error("server error (HTTP {status}): {message}")]
    Status { status: u16, message: String },

    /// The response body did not have the expected shape.
    #[error("invalid response from {endpoint}: {message}")]
    InvalidResponse { endpoint: String, message: String },
}

impl ClientError {
    /// Whether retrying later might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Timeout(_) | ClientError::Network(_) => true,
            ClientError::Status { status, .. } => *status >= 500,
            ClientError::InvalidResponse { .. } => false,
        }
    }
}
