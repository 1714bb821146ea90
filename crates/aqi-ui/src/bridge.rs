use std::sync::{Arc, OnceLock};

use aqi_client::AirQualityClient;
use aqi_core::ClientConfig;

use crate::services::ServiceError;

// Static tokio runtime that lives for the duration of the application
static RUNTIME: OnceLock<tokio::runtime::Runtime> = OnceLock::new();

// Relay-bound client shared by every model
static CLIENT: OnceLock<Arc<AirQualityClient>> = OnceLock::new();

/// Initialize the tokio runtime (call once at application startup)
pub fn init_runtime() -> anyhow::Result<tokio::runtime::Handle> {
    if let Some(runtime) = RUNTIME.get() {
        return Ok(runtime.handle().clone());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("aqi-tokio")
        .build()?;

    // A concurrent initializer may have won; either runtime is fine to hand out.
    Ok(RUNTIME.get_or_init(|| runtime).handle().clone())
}

/// Get the runtime handle if the runtime has been initialized
pub fn get_runtime() -> Option<tokio::runtime::Handle> {
    RUNTIME.get().map(|r| r.handle().clone())
}

/// Build the shared air-quality client from configuration.
/// Later calls return the client created first.
pub fn init_client(config: &ClientConfig) -> Result<Arc<AirQualityClient>, ServiceError> {
    if let Some(client) = CLIENT.get() {
        return Ok(client.clone());
    }

    let client = Arc::new(AirQualityClient::new(config)?);
    tracing::info!("Air-quality client initialized for relay {}", config.relay_url);
    Ok(CLIENT.get_or_init(|| client).clone())
}

/// Get the shared client if it has been initialized
pub fn get_client() -> Option<Arc<AirQualityClient>> {
    CLIENT.get().cloned()
}

/// Runtime and client together, as the search model needs them.
pub fn get_search_services() -> Option<(Arc<AirQualityClient>, tokio::runtime::Handle)> {
    Some((get_client()?, get_runtime()?))
}
