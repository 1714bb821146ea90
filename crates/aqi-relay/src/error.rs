//! Relay error types.

use aqi_core::{AppError, RelayFailure, RelayFailureKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Path does not carry a destination URL: {0}")]
    BadDestination(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Request body of {length} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { length: u64, limit: u64 },

    #[error("Upstream request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Upstream returned status {status}")]
    Upstream {
        status: u16,
        kind: RelayFailureKind,
        body: String,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Failed to bind relay: {0}")]
    Bind(String),
}

impl RelayError {
    pub fn kind(&self) -> RelayFailureKind {
        match self {
            Self::BadDestination(_) | Self::InvalidRequest(_) | Self::PayloadTooLarge { .. } => {
                RelayFailureKind::BadRequest
            }
            Self::Upstream { kind, .. } => *kind,
            Self::Network(_) | Self::Client(_) | Self::Bind(_) => RelayFailureKind::Network,
        }
    }

    /// Status the relay answers with for this failure.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadDestination(_) | Self::InvalidRequest(_) => 400,
            Self::PayloadTooLarge { .. } => 413,
            Self::Upstream { status, .. } => *status,
            Self::Network(e) if e.is_timeout() => 504,
            Self::Network(_) => 502,
            Self::Client(_) | Self::Bind(_) => 500,
        }
    }

    /// Structured body sent back to the caller.
    pub fn to_failure(&self) -> RelayFailure {
        let message = match self {
            Self::Upstream {
                kind: RelayFailureKind::Upstream4xx,
                ..
            } => "Upstream rejected the request".to_string(),
            Self::Upstream { .. } => "Upstream failed to handle the request".to_string(),
            other => other.to_string(),
        };

        let detail = match self {
            Self::Upstream { body, .. } if !body.is_empty() => Some(body.clone()),
            _ => None,
        };

        RelayFailure {
            kind: self.kind(),
            status: self.status_code(),
            message,
            detail,
        }
    }
}

impl From<RelayError> for AppError {
    fn from(e: RelayError) -> Self {
        AppError::Service(e.to_string())
    }
}
