//! Centralized error types for the AQI application.
//!
//! This module provides a typed error hierarchy that:
//! - Enables precise error handling throughout the workspace
//! - Provides user-friendly messages suitable for display
//! - Carries the relay's structured failure body shared by relay and client

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get a display-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Service-level errors (relay, search flow) mapped from other crates.
    #[error("Service error: {0}")]
    Service(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Io(_) => "A file or socket operation failed. Please try again.",
            AppError::Service(_) => "Something went wrong. Please try again.",
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to connect. Check your internet connection."
            }
            NetworkError::Timeout => "The request timed out. Please try again.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The server is experiencing issues. Please try again later."
            }
            NetworkError::ServerError { .. } => "The request failed. Please try again.",
            NetworkError::InvalidResponse(_) => {
                "Received an unexpected response. Please try again."
            }
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::MissingSetting(_) => "A required setting is missing. Check your settings.",
        }
    }
}

/// Why a relayed request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelayFailureKind {
    /// The relay could not reach the upstream API.
    Network,
    /// Upstream answered with a 4xx status.
    #[serde(rename = "upstream_4xx")]
    Upstream4xx,
    /// Upstream answered with a 5xx status.
    #[serde(rename = "upstream_5xx")]
    Upstream5xx,
    /// The inbound request was unusable (no destination URL, bad header).
    BadRequest,
}

impl RelayFailureKind {
    /// Classify an upstream status code. `None` for statuses that are not failures.
    pub fn from_upstream_status(status: u16) -> Option<Self> {
        match status {
            400..=499 => Some(Self::Upstream4xx),
            500..=599 => Some(Self::Upstream5xx),
            _ => None,
        }
    }
}

/// JSON body the relay sends with every failed request.
///
/// Wire shape: `{"error":{"kind":"upstream_4xx","status":404,"message":"…","detail":"…"}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayFailure {
    pub kind: RelayFailureKind,
    pub status: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct RelayFailureEnvelope {
    error: RelayFailure,
}

impl RelayFailure {
    /// Serialize into the relay's error envelope.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&RelayFailureEnvelope {
            error: self.clone(),
        })
        .unwrap_or_else(|_| format!("{{\"error\":{{\"message\":\"{}\"}}}}", self.message))
    }

    /// Parse a relay error envelope; `None` if the body is something else.
    pub fn from_json(body: &str) -> Option<Self> {
        serde_json::from_str::<RelayFailureEnvelope>(body)
            .ok()
            .map(|envelope| envelope.error)
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}
