//! Place search backend.

use std::sync::Arc;

use aqi_client::AirQualityClient;
use tokio::runtime::Handle;

use super::{SearchMessage, SearchSender, ServiceError};

/// Request a place search asynchronously.
/// Sends `PlacesLoaded` tagged with `generation` when complete.
pub fn request_search(
    tx: &SearchSender,
    runtime: &Handle,
    client: Arc<AirQualityClient>,
    query: String,
    generation: u64,
) {
    let tx = tx.clone();
    runtime.spawn(async move {
        let result = client
            .search_places(&query)
            .await
            .map_err(ServiceError::from);

        match &result {
            Ok(places) => tracing::info!(query = %query, count = places.len(), "Places found"),
            Err(e) => tracing::error!(query = %query, "Place search failed: {}", e),
        }

        let _ = tx.send(SearchMessage::PlacesLoaded { generation, result });
    });
}
