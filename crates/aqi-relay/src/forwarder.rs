//! Outbound half of the relay: build the upstream request and classify the answer.

use std::time::Duration;

use aqi_core::{RelayConfig, RelayFailureKind};
use bytes::Bytes;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, COOKIE, HOST, SET_COOKIE,
    USER_AGENT,
};
use reqwest::{Client, Method};

use crate::destination::{destination_url, host_header};
use crate::error::RelayError;

/// Inbound request as seen by the relay, independent of the server framework.
#[derive(Debug, Clone, Default)]
pub struct RelayRequest {
    pub method: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    /// Raw header bytes; browsers may send non-ASCII cookie values.
    pub cookie: Option<Bytes>,
    pub user_agent: Option<Bytes>,
    pub body: Bytes,
}

/// Upstream answer to hand back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayResponse {
    pub status: u16,
    pub content_type: String,
    pub set_cookies: Vec<String>,
    pub body: String,
}

/// Forwards relay requests to their embedded destination with the API key attached.
pub struct Forwarder {
    client: Client,
    path_prefix: String,
    api_key: String,
    max_body_bytes: u64,
}

impl Forwarder {
    pub fn new(config: &RelayConfig, api_key: impl Into<String>) -> Result<Self, RelayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.upstream_timeout_secs))
            .build()
            .map_err(|e| RelayError::Client(e.to_string()))?;

        Ok(Self {
            client,
            path_prefix: config.path_prefix.clone(),
            api_key: api_key.into(),
            max_body_bytes: config.max_body_bytes,
        })
    }

    pub fn max_body_bytes(&self) -> u64 {
        self.max_body_bytes
    }

    /// Build the upstream request for an inbound relay request.
    pub fn build_outbound(&self, req: &RelayRequest) -> Result<reqwest::Request, RelayError> {
        let url = destination_url(&req.path, &self.path_prefix, &req.query)?;

        let method = Method::from_bytes(req.method.to_uppercase().as_bytes())
            .map_err(|_| RelayError::InvalidRequest(format!("method {}", req.method)))?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, header_value("authorization", self.api_key.as_bytes())?);
        headers.insert(
            COOKIE,
            header_value("cookie", req.cookie.as_deref().unwrap_or_default())?,
        );
        headers.insert(
            USER_AGENT,
            header_value("user-agent", req.user_agent.as_deref().unwrap_or_default())?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        if let Some(host) = host_header(&url) {
            headers.insert(HOST, header_value("host", host.as_bytes())?);
        }

        let mut builder = self.client.request(method.clone(), url).headers(headers);
        if method != Method::GET && method != Method::HEAD {
            builder = builder.body(req.body.clone());
        }

        builder
            .build()
            .map_err(|e| RelayError::InvalidRequest(e.to_string()))
    }

    /// Forward one request. No retries.
    #[tracing::instrument(skip(self, req), fields(method = %req.method, path = %req.path))]
    pub async fn forward(&self, req: &RelayRequest) -> Result<RelayResponse, RelayError> {
        let outbound = self.build_outbound(req)?;
        let target = outbound.url().clone();
        tracing::info!(method = %outbound.method(), url = %target, "Relaying request");

        let response = self.client.execute(outbound).await.map_err(|e| {
            tracing::warn!(url = %target, error = %e, "Upstream unreachable");
            RelayError::Network(e)
        })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("text/plain")
            .to_string();
        let set_cookies = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect::<Vec<_>>();

        let body = response.text().await?;

        if let Some(kind) = RelayFailureKind::from_upstream_status(status) {
            tracing::warn!(url = %target, status, ?kind, "Upstream returned an error");
            return Err(RelayError::Upstream { status, kind, body });
        }

        tracing::debug!(url = %target, status, bytes = body.len(), "Upstream responded");

        Ok(RelayResponse {
            status,
            content_type,
            set_cookies,
            body,
        })
    }
}

fn header_value(name: &str, value: &[u8]) -> Result<HeaderValue, RelayError> {
    HeaderValue::from_bytes(value)
        .map_err(|_| RelayError::InvalidRequest(format!("header {} is not forwardable", name)))
}
