pub mod config;
pub mod error;
pub mod request_state;

pub use config::{ClientConfig, Config, RelayConfig, ValidationResult};
pub use error::{
    AppError, ConfigError, NetworkError, RelayFailure, RelayFailureKind, ReqwestErrorExt,
};
pub use request_state::{RequestKind, RequestTracker};

use anyhow::Result;

/// Initialize logging at `default_level` unless `RUST_LOG` says otherwise.
///
/// Logs go to stderr so stdout stays free for the terminal front-end.
/// Safe to call more than once; later calls keep the first subscriber.
pub fn init(default_level: &str) -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();

    tracing::info!("AQI core initialized");
    Ok(())
}
