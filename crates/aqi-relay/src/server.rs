//! HTTP surface of the relay.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use aqi_core::RelayConfig;
use bytes::Bytes;
use tracing::{info, warn};
use warp::http::header::{HeaderName, CONTENT_TYPE, COOKIE, SET_COOKIE, USER_AGENT};
use warp::http::{HeaderMap, Method, Response, StatusCode};
use warp::hyper::Body;
use warp::path::FullPath;
use warp::{Filter, Rejection, Reply};

use crate::error::RelayError;
use crate::forwarder::{Forwarder, RelayRequest, RelayResponse};

/// Catch-all route: any method, any path, any query, any body.
///
/// Every rejection is answered with the relay's JSON failure envelope.
pub fn routes(
    forwarder: Arc<Forwarder>,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let limit = forwarder.max_body_bytes();

    warp::method()
        .and(warp::path::full())
        .and(warp::query::<Vec<(String, String)>>())
        .and(warp::header::headers_cloned())
        .and(body_within(limit))
        .and(warp::body::bytes())
        .and(warp::any().map(move || forwarder.clone()))
        .and_then(handle)
        .recover(handle_rejection)
}

/// Bodies over the limit are refused before they are buffered.
///
/// Requests without a content-length (bodiless GETs, chunked uploads) pass
/// through and are measured after buffering instead.
fn body_within(limit: u64) -> impl Filter<Extract = (), Error = Rejection> + Clone {
    warp::header::optional::<u64>("content-length")
        .and_then(move |length: Option<u64>| async move {
            match length {
                Some(length) if length > limit => {
                    Err(warp::reject::custom(Refused(RelayError::PayloadTooLarge {
                        length,
                        limit,
                    })))
                }
                _ => Ok(()),
            }
        })
        .untuple_one()
}

#[derive(Debug)]
struct Refused(RelayError);

impl warp::reject::Reject for Refused {}

async fn handle(
    method: Method,
    path: FullPath,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
    forwarder: Arc<Forwarder>,
) -> Result<Response<Body>, Rejection> {
    let limit = forwarder.max_body_bytes();
    if body.len() as u64 > limit {
        return Ok(failure_response(&RelayError::PayloadTooLarge {
            length: body.len() as u64,
            limit,
        }));
    }

    let request = RelayRequest {
        method: method.as_str().to_string(),
        path: path.as_str().to_string(),
        query,
        cookie: raw_header(&headers, COOKIE),
        user_agent: raw_header(&headers, USER_AGENT),
        body,
    };

    Ok(match forwarder.forward(&request).await {
        Ok(relayed) => success_response(relayed),
        Err(e) => failure_response(&e),
    })
}

fn raw_header(headers: &HeaderMap, name: HeaderName) -> Option<Bytes> {
    headers
        .get(name)
        .map(|value| Bytes::copy_from_slice(value.as_bytes()))
}

async fn handle_rejection(rejection: Rejection) -> Result<Response<Body>, Infallible> {
    if let Some(Refused(error)) = rejection.find::<Refused>() {
        return Ok(failure_response(error));
    }
    let error = RelayError::InvalidRequest(format!("{:?}", rejection));
    Ok(failure_response(&error))
}

fn success_response(relayed: RelayResponse) -> Response<Body> {
    let mut builder = Response::builder()
        .status(relayed.status)
        .header(CONTENT_TYPE, relayed.content_type.as_str());
    for cookie in &relayed.set_cookies {
        builder = builder.header(SET_COOKIE, cookie.as_str());
    }

    builder
        .body(Body::from(relayed.body))
        .unwrap_or_else(|e| internal_error(&e.to_string()))
}

fn failure_response(error: &RelayError) -> Response<Body> {
    let failure = error.to_failure();
    warn!(kind = ?failure.kind, status = failure.status, "Relay request failed: {}", error);

    Response::builder()
        .status(failure.status)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(failure.to_json()))
        .unwrap_or_else(|e| internal_error(&e.to_string()))
}

fn internal_error(reason: &str) -> Response<Body> {
    tracing::error!("Failed to build relay response: {}", reason);
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}

/// Bind the relay and return the bound address plus the server future.
///
/// The server stops when `shutdown` resolves.
pub fn bind(
    config: &RelayConfig,
    api_key: impl Into<String>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(SocketAddr, impl Future<Output = ()> + Send + 'static), RelayError> {
    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port)
        .parse()
        .map_err(|e| RelayError::Bind(format!("{}:{}: {}", config.bind_address, config.port, e)))?;

    let forwarder = Arc::new(Forwarder::new(config, api_key)?);

    warp::serve(routes(forwarder))
        .try_bind_with_graceful_shutdown(addr, shutdown)
        .map_err(|e| RelayError::Bind(e.to_string()))
}

/// Run the relay until Ctrl+C or SIGTERM.
pub async fn serve(config: &RelayConfig, api_key: impl Into<String>) -> Result<(), RelayError> {
    let (addr, server) = bind(config, api_key, shutdown_signal())?;
    info!(%addr, prefix = %config.path_prefix, "Relay listening");

    server.await;

    info!("Relay shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
