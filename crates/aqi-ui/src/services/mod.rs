//! Async backends for the search flow.
//! All network work runs off the caller's thread; results come back over a channel.

pub mod place_service;
pub mod readings_service;

use aqi_client::{ClientError, Place, Reading};
use tokio::sync::mpsc::UnboundedSender;

pub use place_service::request_search;
pub use readings_service::request_fetch;

/// Error type for search-flow operations
#[derive(Debug)]
pub enum ServiceError {
    Client(ClientError),
    NotInitialized,
}

impl ServiceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ServiceError::Client(e) => e.user_message(),
            ServiceError::NotInitialized => "Air-quality service not initialized",
        }
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::Client(e) => write!(f, "{}", e),
            ServiceError::NotInitialized => write!(f, "Air-quality service not initialized"),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<ClientError> for ServiceError {
    fn from(e: ClientError) -> Self {
        ServiceError::Client(e)
    }
}

/// Messages sent from async operations back to the model's owner.
///
/// Every result carries the generation it was requested under so late
/// answers can be told apart from current ones.
#[derive(Debug)]
pub enum SearchMessage {
    /// The debounce timer for query revision `revision` expired
    QuerySettled { revision: u64 },
    /// Result of a place search
    PlacesLoaded {
        generation: u64,
        result: Result<Vec<Place>, ServiceError>,
    },
    /// Result of a reading fetch for `place_id`
    ReadingsLoaded {
        generation: u64,
        place_id: String,
        result: Result<Vec<Reading>, ServiceError>,
    },
}

pub type SearchSender = UnboundedSender<SearchMessage>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_error_display() {
        assert!(format!("{}", ServiceError::NotInitialized).contains("not initialized"));
        assert!(format!("{}", ServiceError::Client(ClientError::NoPlaces)).contains("places"));
    }

    #[test]
    fn service_error_user_message() {
        assert_eq!(
            ServiceError::Client(ClientError::NoPlaces).user_message(),
            "Cannot find any places with that name"
        );
    }
}
