use std::sync::Arc;
use std::time::Duration;

use aqi_client::{AirQualityClient, Place, Reading};
use aqi_core::{RequestKind, RequestTracker};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::debounce::Debouncer;
use crate::filter::filter_by_prefix;
use crate::services::{self, SearchMessage, SearchSender, ServiceError};
use crate::view::{Header, PlaceOption, PlacesPanel, ReadingRow, ReadingsPanel, SearchView};

/// What changed after a message was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchEvent {
    /// The message was stale and dropped
    Ignored,
    /// The debounced query was empty and the flow was cleared
    Cleared,
    /// A place search went out for the settled query
    SearchStarted,
    PlacesChanged,
    ReadingsChanged,
    ErrorChanged,
}

/// State of the search-and-select flow.
///
/// Owned by one thread: event handlers (`set_query`, `select_place`,
/// `toggle_prefix_filter`, `reset`) and the channel drain (`poll_channel` /
/// `next_event`) mutate it; network calls and the debounce timer run on the
/// runtime and report back over the channel.
pub struct SearchModel {
    client: Arc<AirQualityClient>,
    runtime: Handle,
    tx: SearchSender,
    rx: UnboundedReceiver<SearchMessage>,
    debouncer: Debouncer,

    query: String,
    query_revision: u64,
    places: Vec<Place>,
    selected_place_id: Option<String>,
    readings: Vec<Reading>,
    readings_loaded: bool,
    error: Option<String>,
    prefix_filter: bool,

    search: RequestTracker,
    fetch: RequestTracker,
}

impl SearchModel {
    pub fn new(client: Arc<AirQualityClient>, runtime: Handle, debounce: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            client,
            runtime,
            tx,
            rx,
            debouncer: Debouncer::new(debounce),
            query: String::new(),
            query_revision: 0,
            places: Vec::new(),
            selected_place_id: None,
            readings: Vec::new(),
            readings_loaded: false,
            error: None,
            prefix_filter: false,
            search: RequestTracker::new(RequestKind::SearchPlaces),
            fetch: RequestTracker::new(RequestKind::FetchReadings),
        }
    }

    /// Build from the globally initialized client and runtime.
    pub fn from_bridge(debounce: Duration) -> Result<Self, ServiceError> {
        match crate::bridge::get_search_services() {
            Some((client, runtime)) => {
                tracing::info!("SearchModel initialized from global services");
                Ok(Self::new(client, runtime, debounce))
            }
            None => {
                tracing::error!("Cannot initialize SearchModel - global services not ready");
                Err(ServiceError::NotInitialized)
            }
        }
    }

    // ---- event handlers ----

    /// Record a query edit and restart the debounce timer.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.query_revision += 1;

        let revision = self.query_revision;
        let tx = self.tx.clone();
        self.debouncer.schedule(&self.runtime, move || {
            let _ = tx.send(SearchMessage::QuerySettled { revision });
        });
    }

    /// Search places for the current query. Returns `false` (and does
    /// nothing) when the query is empty.
    pub fn search_places(&mut self) -> bool {
        if self.query.is_empty() {
            return false;
        }

        let generation = self.search.begin();
        self.error = None;
        services::request_search(
            &self.tx,
            &self.runtime,
            self.client.clone(),
            self.query.clone(),
            generation,
        );
        true
    }

    /// Select a candidate and fetch its readings. Returns whether a fetch started.
    pub fn select_place(&mut self, place_id: impl Into<String>) -> bool {
        let place_id = place_id.into();

        let same = self.selected_place_id.as_deref() == Some(place_id.as_str());
        if same && (self.fetch.in_flight() || self.readings_loaded) {
            tracing::debug!(place_id = %place_id, "Place already selected");
            return false;
        }

        self.selected_place_id = Some(place_id);
        self.fetch_readings()
    }

    /// Fetch readings for the selected place.
    pub fn fetch_readings(&mut self) -> bool {
        let Some(place_id) = self.selected_place_id.clone() else {
            return false;
        };

        let generation = self.fetch.begin();
        self.error = None;
        self.readings_loaded = false;
        services::request_fetch(
            &self.tx,
            &self.runtime,
            self.client.clone(),
            place_id,
            generation,
        );
        true
    }

    /// Flip the prefix filter; returns the new state. Never refetches.
    pub fn toggle_prefix_filter(&mut self) -> bool {
        self.prefix_filter = !self.prefix_filter;
        self.prefix_filter
    }

    pub fn set_prefix_filter(&mut self, enabled: bool) {
        self.prefix_filter = enabled;
    }

    /// Clear everything and drop whatever is pending or in flight.
    pub fn reset(&mut self) {
        self.debouncer.cancel();
        self.query.clear();
        self.query_revision += 1;
        self.clear_results();
    }

    // ---- channel drain ----

    /// Apply one pending message without blocking.
    pub fn poll_channel(&mut self) -> Option<SearchEvent> {
        let msg = self.rx.try_recv().ok()?;
        Some(self.apply(msg))
    }

    /// Wait for the next message and apply it.
    pub async fn next_event(&mut self) -> Option<SearchEvent> {
        let msg = self.rx.recv().await?;
        Some(self.apply(msg))
    }

    fn apply(&mut self, msg: SearchMessage) -> SearchEvent {
        match msg {
            SearchMessage::QuerySettled { revision } => {
                if revision != self.query_revision {
                    tracing::debug!(revision, "Discarding superseded query");
                    return SearchEvent::Ignored;
                }
                self.settle_query()
            }
            SearchMessage::PlacesLoaded { generation, result } => {
                if !self.search.finish(generation) {
                    return SearchEvent::Ignored;
                }
                match result {
                    Ok(places) => {
                        self.places = places;
                        SearchEvent::PlacesChanged
                    }
                    Err(e) => self.record_error(&e),
                }
            }
            SearchMessage::ReadingsLoaded {
                generation,
                place_id,
                result,
            } => {
                if !self.fetch.finish(generation) {
                    return SearchEvent::Ignored;
                }
                match result {
                    Ok(readings) => {
                        tracing::info!(place_id = %place_id, count = readings.len(), "Readings loaded");
                        self.readings = readings;
                        self.readings_loaded = true;
                        SearchEvent::ReadingsChanged
                    }
                    Err(e) => self.record_error(&e),
                }
            }
        }
    }

    fn settle_query(&mut self) -> SearchEvent {
        // Readings belong to the previous query; drop them now rather than
        // when the new search lands.
        self.readings.clear();
        self.readings_loaded = false;
        self.fetch.invalidate();

        if self.query.is_empty() {
            self.clear_results();
            return SearchEvent::Cleared;
        }

        self.search_places();
        SearchEvent::SearchStarted
    }

    fn clear_results(&mut self) {
        self.places.clear();
        self.selected_place_id = None;
        self.readings.clear();
        self.readings_loaded = false;
        self.error = None;
        self.search.invalidate();
        self.fetch.invalidate();
    }

    fn record_error(&mut self, e: &ServiceError) -> SearchEvent {
        if let ServiceError::Client(client_error) = e {
            if let Some(kind) = client_error.relay_failure_kind() {
                tracing::warn!(?kind, "Relay reported failure");
            }
        }
        self.error = Some(e.user_message().to_string());
        SearchEvent::ErrorChanged
    }

    // ---- accessors ----

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn places(&self) -> &[Place] {
        &self.places
    }

    /// Candidates after the optional prefix filter.
    pub fn visible_places(&self) -> Vec<&Place> {
        if self.prefix_filter {
            filter_by_prefix(&self.places, &self.query)
        } else {
            self.places.iter().collect()
        }
    }

    pub fn selected_place_id(&self) -> Option<&str> {
        self.selected_place_id.as_deref()
    }

    /// The selected candidate, if it is in the current list.
    pub fn selected_place(&self) -> Option<&Place> {
        let id = self.selected_place_id.as_deref()?;
        self.places.iter().find(|p| p.id == id)
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_searching(&self) -> bool {
        self.search.in_flight()
    }

    pub fn is_loading(&self) -> bool {
        self.fetch.in_flight()
    }

    pub fn view(&self) -> SearchView {
        let header = self.selected_place().map(|place| Header {
            name: place.name.clone(),
            description: place.description.clone(),
        });

        let places = if self.is_searching() {
            PlacesPanel::Searching
        } else if let Some(error) = &self.error {
            PlacesPanel::Error(error.clone())
        } else {
            PlacesPanel::Listed(
                self.visible_places()
                    .into_iter()
                    .map(PlaceOption::from)
                    .collect(),
            )
        };

        let readings = if self.is_loading() {
            ReadingsPanel::Loading
        } else if let Some(error) = &self.error {
            ReadingsPanel::Error(error.clone())
        } else if self.query.is_empty() || !self.readings_loaded {
            ReadingsPanel::Hidden
        } else if self.readings.is_empty() {
            ReadingsPanel::NoData
        } else {
            ReadingsPanel::Rows(self.readings.iter().map(ReadingRow::from).collect())
        };

        SearchView {
            query: self.query.clone(),
            prefix_filter: self.prefix_filter,
            header,
            places,
            readings,
        }
    }
}
