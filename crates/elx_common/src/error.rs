//! Error types for the cloud API boundary.

use std::time::Duration;
use thiserror::Error;

/// Failure of a single cloud API call.
///
/// Any of these aborts the collection pass that issued the call. None of them
/// outlive the pass.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Request timeout after {0:?}")]
    Timeout(Duration),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Client configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Short stable label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Http(_) => "http",
            ApiError::Status { .. } => "status",
            ApiError::Decode(_) => "decode",
            ApiError::Timeout(_) => "timeout",
            ApiError::Cancelled => "cancelled",
            ApiError::Config(_) => "config",
        }
    }
}
