//! Client-side error types for relay-bound calls.

use aqi_core::{AppError, ConfigError, NetworkError, RelayFailure, RelayFailureKind, RequestKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport fault reaching the relay
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// The relay answered with a non-success status
    #[error("Relay returned status {status} for {}", .operation.label())]
    Status {
        operation: RequestKind,
        status: u16,
        failure: Option<RelayFailure>,
    },

    /// Upstream reported `places: null`
    #[error("No places found")]
    NoPlaces,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl ClientError {
    /// User-facing message stored in the flow's error slot.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Network(e) => e.user_message(),
            Self::Status {
                operation: RequestKind::SearchPlaces,
                ..
            } => "Something went wrong fetching places.",
            Self::Status {
                operation: RequestKind::FetchReadings,
                ..
            } => "Something went wrong fetching data.",
            Self::NoPlaces => "Cannot find any places with that name",
            Self::InvalidResponse(_) => "Received an unexpected response. Please try again.",
            Self::InvalidUrl(_) | Self::Client(_) => {
                "The air quality service is misconfigured. Check your settings."
            }
        }
    }

    /// Structured failure kind reported by the relay, if any.
    pub fn relay_failure_kind(&self) -> Option<RelayFailureKind> {
        match self {
            Self::Status {
                failure: Some(f), ..
            } => Some(f.kind),
            _ => None,
        }
    }
}

impl From<ClientError> for AppError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Network(n) => AppError::Network(n),
            ClientError::InvalidUrl(s) | ClientError::Client(s) => {
                AppError::Config(ConfigError::Invalid(s))
            }
            other => AppError::Service(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_messages_are_per_operation() {
        let places = ClientError::Status {
            operation: RequestKind::SearchPlaces,
            status: 500,
            failure: None,
        };
        let readings = ClientError::Status {
            operation: RequestKind::FetchReadings,
            status: 500,
            failure: None,
        };
        assert_eq!(places.user_message(), "Something went wrong fetching places.");
        assert_eq!(readings.user_message(), "Something went wrong fetching data.");
    }

    #[test]
    fn test_no_places_message() {
        assert_eq!(
            ClientError::NoPlaces.user_message(),
            "Cannot find any places with that name"
        );
    }

    #[test]
    fn test_relay_failure_kind() {
        let err = ClientError::Status {
            operation: RequestKind::FetchReadings,
            status: 502,
            failure: Some(RelayFailure {
                kind: RelayFailureKind::Network,
                status: 502,
                message: "upstream unreachable".into(),
                detail: None,
            }),
        };
        assert_eq!(err.relay_failure_kind(), Some(RelayFailureKind::Network));
        assert_eq!(ClientError::NoPlaces.relay_failure_kind(), None);
    }

    #[test]
    fn test_app_error_mapping() {
        let app: AppError = ClientError::InvalidUrl("bad".into()).into();
        assert!(matches!(app, AppError::Config(ConfigError::Invalid(_))));

        let app: AppError = ClientError::Network(NetworkError::Timeout).into();
        assert!(matches!(app, AppError::Network(NetworkError::Timeout)));
    }
}
