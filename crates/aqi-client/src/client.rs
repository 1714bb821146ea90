//! Air-quality API client. Every call goes through the relay; the relay owns
//! the API key, so no authorization header is ever sent from here.

use std::time::Duration;

use aqi_core::{ClientConfig, RelayFailure, ReqwestErrorExt, RequestKind};
use serde_json::Value;
use tracing::instrument;
use url::Url;

use crate::error::ClientError;
use crate::types::{CurrentConditions, Place, Reading};

const USER_AGENT: &str = concat!("aqi/", env!("CARGO_PKG_VERSION"));
const PLACE_SEARCH_ENDPOINT: &str = "place_search";
const CURRENT_CONDITIONS_ENDPOINT: &str = "current_air_condition";

#[derive(Debug, Clone)]
pub struct AirQualityClient {
    client: reqwest::Client,
    relay_url: String,
    upstream_base_url: String,
    lang: String,
    standard: String,
}

impl AirQualityClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .build()
            .map_err(|e| ClientError::Client(e.to_string()))?;

        Url::parse(&config.relay_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        Url::parse(&config.upstream_base_url)
            .map_err(|e| ClientError::InvalidUrl(e.to_string()))?;

        Ok(Self {
            client,
            relay_url: with_trailing_slash(&config.relay_url),
            upstream_base_url: with_trailing_slash(&config.upstream_base_url),
            lang: config.lang.clone(),
            standard: config.standard.clone(),
        })
    }

    /// Relay URL for an upstream endpoint: the relay prefix followed by the
    /// percent-encoded absolute upstream URL.
    pub fn endpoint_url(&self, endpoint: &str) -> Result<Url, ClientError> {
        let destination = format!("{}{}", self.upstream_base_url, endpoint);
        let raw = format!("{}{}", self.relay_url, urlencoding::encode(&destination));
        Url::parse(&raw).map_err(|e| ClientError::InvalidUrl(e.to_string()))
    }

    /// Resolve candidate places for a free-text query.
    ///
    /// An empty query never reaches the network and yields an empty list.
    #[instrument(skip(self), level = "info")]
    pub async fn search_places(&self, query: &str) -> Result<Vec<Place>, ClientError> {
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let mut url = self.endpoint_url(PLACE_SEARCH_ENDPOINT)?;
        url.query_pairs_mut()
            .append_pair("lang", &self.lang)
            .append_pair("content", query);

        let payload = self.get_json(RequestKind::SearchPlaces, url).await?;

        let places = match payload.get("places") {
            None | Some(Value::Null) => return Err(ClientError::NoPlaces),
            Some(places) => places.clone(),
        };

        let places: Vec<Place> = serde_json::from_value(places)
            .map_err(|e| ClientError::InvalidResponse(format!("places: {}", e)))?;

        tracing::info!("Found {} places for {:?}", places.len(), query);
        Ok(places)
    }

    /// Fetch current readings for a place.
    #[instrument(skip(self), level = "info")]
    pub async fn current_readings(&self, place_id: &str) -> Result<Vec<Reading>, ClientError> {
        let mut url = self.endpoint_url(CURRENT_CONDITIONS_ENDPOINT)?;
        url.query_pairs_mut()
            .append_pair("place_id", place_id)
            .append_pair("lang", &self.lang)
            .append_pair("standard", &self.standard);

        let payload = self.get_json(RequestKind::FetchReadings, url).await?;

        if reports_no_places(&payload) {
            return Err(ClientError::NoPlaces);
        }

        let conditions: CurrentConditions = serde_json::from_value(payload)
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        let latest = conditions
            .latest
            .ok_or_else(|| ClientError::InvalidResponse("missing latest conditions".into()))?;

        tracing::info!("Fetched {} readings for {}", latest.readings.len(), place_id);
        Ok(latest.readings)
    }

    /// Issue a GET and decode the JSON body.
    ///
    /// A `places: null` payload is reported as `NoPlaces` whatever the status.
    async fn get_json(&self, operation: RequestKind, url: Url) -> Result<Value, ClientError> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.into_network_error()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Network(e.into_network_error()))?;

        if status.is_success() {
            return serde_json::from_str(&body).map_err(|e| {
                ClientError::InvalidResponse(format!("{} payload: {}", operation.label(), e))
            });
        }

        let failure = RelayFailure::from_json(&body);
        let upstream_body = failure
            .as_ref()
            .and_then(|f| f.detail.as_deref())
            .unwrap_or(&body);

        if serde_json::from_str::<Value>(upstream_body)
            .map(|v| reports_no_places(&v))
            .unwrap_or(false)
        {
            return Err(ClientError::NoPlaces);
        }

        tracing::warn!(
            "Relay returned {} for {} ({:?})",
            status,
            operation.label(),
            failure.as_ref().map(|f| f.kind)
        );

        Err(ClientError::Status {
            operation,
            status: status.as_u16(),
            failure,
        })
    }
}

fn reports_no_places(payload: &Value) -> bool {
    matches!(payload.get("places"), Some(Value::Null))
}

fn with_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}
