use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Environment variable that overrides `relay.api_key`.
pub const API_KEY_ENV: &str = "AQI_API_KEY";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Relay server settings
    #[serde(default)]
    pub relay: RelayConfig,

    /// Search client settings
    #[serde(default)]
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Address the relay listens on
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port the relay listens on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path segment that precedes the encoded destination URL
    #[serde(default = "default_path_prefix")]
    pub path_prefix: String,

    /// Upstream API key. Only the relay ever holds it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Upstream request timeout in seconds
    #[serde(default = "default_upstream_timeout")]
    pub upstream_timeout_secs: u64,

    /// Largest inbound body the relay accepts, in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: u64,
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8888
}

fn default_path_prefix() -> String {
    ".netlify/functions/cors/".to_string()
}

fn default_upstream_timeout() -> u64 {
    15
}

fn default_max_body_bytes() -> u64 {
    1024 * 1024
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            path_prefix: default_path_prefix(),
            api_key: None,
            upstream_timeout_secs: default_upstream_timeout(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl RelayConfig {
    /// API key from `AQI_API_KEY`, falling back to the config file.
    pub fn effective_api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.api_key.clone().filter(|k| !k.trim().is_empty()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Relay endpoint, including the path prefix
    #[serde(default = "default_relay_url")]
    pub relay_url: String,

    /// Upstream API base the relay forwards to
    #[serde(default = "default_upstream_base_url")]
    pub upstream_base_url: String,

    #[serde(default = "default_lang")]
    pub lang: String,

    /// Index standard requested for readings
    #[serde(default = "default_standard")]
    pub standard: String,

    /// Quiet period before a query edit triggers a search
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default = "default_client_timeout")]
    pub timeout_secs: u64,
}

fn default_relay_url() -> String {
    format!(
        "http://{}:{}/{}",
        default_bind_address(),
        default_port(),
        default_path_prefix()
    )
}

fn default_upstream_base_url() -> String {
    "https://api.air-matters.app/".to_string()
}

fn default_lang() -> String {
    "en".to_string()
}

fn default_standard() -> String {
    "aqi_us".to_string()
}

fn default_debounce_ms() -> u64 {
    1000
}

fn default_client_timeout() -> u64 {
    10
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_url: default_relay_url(),
            upstream_base_url: default_upstream_base_url(),
            lang: default_lang(),
            standard: default_standard(),
            debounce_ms: default_debounce_ms(),
            timeout_secs: default_client_timeout(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from `path`, writing defaults there if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            tracing::info!("Wrote default configuration to {}", path.display());
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Warnings are logged; errors fail the load.
    pub fn load_validated(path: Option<&Path>) -> Result<(Self, ValidationResult), ConfigError> {
        let config = match path {
            Some(p) => Self::load_from(p),
            None => Self::load(),
        }
        .map_err(|e| ConfigError::ParseError(format!("{:#}", e)))?;

        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()));
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.relay.bind_address.parse::<std::net::IpAddr>().is_err() {
            result.add_error(
                "relay.bind_address",
                format!("Not an IP address: {}", self.relay.bind_address),
            );
        }

        if self.relay.port == 0 {
            result.add_error("relay.port", "Port cannot be 0");
        }

        if self.relay.path_prefix.trim_matches('/').is_empty() {
            result.add_error("relay.path_prefix", "Path prefix cannot be empty");
        }

        if self.relay.effective_api_key().is_none() {
            result.add_warning(
                "relay.api_key",
                format!("No API key configured (set {API_KEY_ENV}) - the relay will not start"),
            );
        }

        if self.relay.upstream_timeout_secs == 0 {
            result.add_error("relay.upstream_timeout_secs", "Timeout must be greater than 0");
        }

        if self.relay.max_body_bytes == 0 {
            result.add_error("relay.max_body_bytes", "Body limit must be greater than 0");
        }

        self.validate_url(&self.client.relay_url, "client.relay_url", &mut result);
        self.validate_url(
            &self.client.upstream_base_url,
            "client.upstream_base_url",
            &mut result,
        );

        if self.client.debounce_ms == 0 {
            result.add_warning(
                "client.debounce_ms",
                "Debounce disabled (0 ms) - every edit triggers a search",
            );
        } else if self.client.debounce_ms > 10_000 {
            result.add_warning("client.debounce_ms", "Debounce is longer than 10 seconds");
        }

        if self.client.timeout_secs == 0 {
            result.add_error("client.timeout_secs", "Timeout must be greater than 0");
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if url.port() == Some(0) {
                    result.add_error(field_name, "Port cannot be 0");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("aqi");

        Ok(config_dir.join("config.toml"))
    }
}
