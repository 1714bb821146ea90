//! Current-readings backend.

use std::sync::Arc;

use aqi_client::AirQualityClient;
use tokio::runtime::Handle;

use super::{SearchMessage, SearchSender, ServiceError};

/// Request current readings for a place asynchronously.
/// Sends `ReadingsLoaded` tagged with `generation` when complete.
pub fn request_fetch(
    tx: &SearchSender,
    runtime: &Handle,
    client: Arc<AirQualityClient>,
    place_id: String,
    generation: u64,
) {
    let tx = tx.clone();
    runtime.spawn(async move {
        let result = client
            .current_readings(&place_id)
            .await
            .map_err(ServiceError::from);

        if let Err(e) = &result {
            tracing::error!(place_id = %place_id, "Reading fetch failed: {}", e);
        }

        let _ = tx.send(SearchMessage::ReadingsLoaded {
            generation,
            place_id,
            result,
        });
    });
}
