//! Integration tests for the relay using a wiremock upstream.

use std::sync::Arc;

use aqi_core::{RelayConfig, RelayFailure, RelayFailureKind};
use aqi_relay::{routes, Forwarder};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PREFIX: &str = "/.netlify/functions/cors/";

fn relay_path(destination: &str) -> String {
    format!(
        "{}{}",
        PREFIX,
        utf8_percent_encode(destination, NON_ALPHANUMERIC)
    )
}

fn forwarder() -> Arc<Forwarder> {
    Arc::new(Forwarder::new(&RelayConfig::default(), "test-key").unwrap())
}

fn body_text(response: &warp::http::Response<bytes::Bytes>) -> String {
    String::from_utf8(response.body().to_vec()).unwrap()
}

#[tokio::test]
async fn test_relays_search_with_key_and_query() {
    let upstream = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/place_search"))
        .and(query_param("lang", "en"))
        .and(query_param("content", "Lon"))
        .and(header("authorization", "test-key"))
        .and(header("accept", "*/*"))
        .and(header("content-type", "application/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/json")
                .set_body_string(r#"{"places":[]}"#),
        )
        .expect(1)
        .mount(&upstream)
        .await;

    let destination = format!("{}/place_search", upstream.uri());
    let response = warp::test::request()
        .method("GET")
        .path(&format!("{}?lang=en&content=Lon", relay_path(&destination)))
        .reply(&routes(forwarder()))
        .await;

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-type"], "application/json");
    assert_eq!(body_text(&response), r#"{"places":[]}"#);
}

#[tokio::test]
async fn test_forwards_caller_cookie_and_user_agent() {
    let upstream = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("cookie", "session=abc"))
        .and(header("user-agent", "browser/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&upstream)
        .await;

    let response = warp::test::request()
        .method("GET")
        .path(&relay_path(&format!("{}/x", upstream.uri())))
        .header("cookie", "session=abc")
        .header("user-agent", "browser/1.0")
        .reply(&routes(forwarder()))
        .await;

    assert_eq!(response.status(), 200);
    // upstream sent no content-type
    assert_eq!(response.headers()["content-type"], "text/plain");
}

#[tokio::test]
async fn test_non_ascii_cookie_is_forwarded_byte_for_byte() {
    let upstream = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/x"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&upstream)
        .await;

    let response = warp::test::request()
        .method("GET")
        .path(&relay_path(&format!("{}/x", upstream.uri())))
        .header("cookie", "name=café".as_bytes())
        .header("user-agent", "navigateur/ü".as_bytes())
        .reply(&routes(forwarder()))
        .await;

    assert_eq!(response.status(), 200);
    assert_eq!(body_text(&response), "ok");

    let received = upstream.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(
        received[0].headers["cookie"].as_bytes(),
        "name=café".as_bytes()
    );
    assert_eq!(
        received[0].headers["user-agent"].as_bytes(),
        "navigateur/ü".as_bytes()
    );
}

#[tokio::test]
async fn test_oversized_body_never_reaches_upstream() {
    let upstream = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;

    let forwarder = Forwarder::new(
        &RelayConfig {
            max_body_bytes: 16,
            ..RelayConfig::default()
        },
        "test-key",
    )
    .unwrap();

    let response = warp::test::request()
        .method("POST")
        .path(&relay_path(&format!("{}/submit", upstream.uri())))
        .body(vec![b'x'; 64])
        .reply(&routes(Arc::new(forwarder)))
        .await;

    assert_eq!(response.status(), 413);
    let failure = RelayFailure::from_json(&body_text(&response)).unwrap();
    assert_eq!(failure.kind, RelayFailureKind::BadRequest);
    assert_eq!(failure.status, 413);
}

#[tokio::test]
async fn test_post_body_forwarded_verbatim() {
    let upstream = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/submit"))
        .and(body_string(r#"{"hello":"world"}"#))
        .respond_with(ResponseTemplate::new(201).set_body_string("created"))
        .expect(1)
        .mount(&upstream)
        .await;

    let response = warp::test::request()
        .method("POST")
        .path(&relay_path(&format!("{}/submit", upstream.uri())))
        .body(r#"{"hello":"world"}"#)
        .reply(&routes(forwarder()))
        .await;

    assert_eq!(response.status(), 201);
    assert_eq!(body_text(&response), "created");
}

#[tokio::test]
async fn test_multiple_set_cookie_headers_survive() {
    let upstream = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("set-cookie", "a=1; Path=/")
                .append_header("set-cookie", "b=2; Path=/")
                .set_body_string("{}"),
        )
        .mount(&upstream)
        .await;

    let response = warp::test::request()
        .method("GET")
        .path(&relay_path(&format!("{}/cookies", upstream.uri())))
        .reply(&routes(forwarder()))
        .await;

    let cookies: Vec<_> = response
        .headers()
        .get_all("set-cookie")
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    assert_eq!(cookies, vec!["a=1; Path=/", "b=2; Path=/"]);
}

#[tokio::test]
async fn test_upstream_4xx_is_propagated() {
    let upstream = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"places":null}"#))
        .mount(&upstream)
        .await;

    let response = warp::test::request()
        .method("GET")
        .path(&relay_path(&format!("{}/place_search", upstream.uri())))
        .reply(&routes(forwarder()))
        .await;

    assert_eq!(response.status(), 404);
    let failure = RelayFailure::from_json(&body_text(&response)).unwrap();
    assert_eq!(failure.kind, RelayFailureKind::Upstream4xx);
    assert_eq!(failure.status, 404);
    assert_eq!(failure.detail.as_deref(), Some(r#"{"places":null}"#));
}

#[tokio::test]
async fn test_upstream_5xx_is_propagated() {
    let upstream = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&upstream)
        .await;

    let response = warp::test::request()
        .method("GET")
        .path(&relay_path(&format!("{}/current_air_condition", upstream.uri())))
        .reply(&routes(forwarder()))
        .await;

    assert_eq!(response.status(), 503);
    let failure = RelayFailure::from_json(&body_text(&response)).unwrap();
    assert_eq!(failure.kind, RelayFailureKind::Upstream5xx);
    assert_eq!(failure.detail, None);
}

#[tokio::test]
async fn test_unreachable_upstream_is_network_failure() {
    let response = warp::test::request()
        .method("GET")
        .path(&relay_path("http://127.0.0.1:9/nothing"))
        .reply(&routes(forwarder()))
        .await;

    assert_eq!(response.status(), 502);
    let failure = RelayFailure::from_json(&body_text(&response)).unwrap();
    assert_eq!(failure.kind, RelayFailureKind::Network);
}

#[tokio::test]
async fn test_bound_relay_serves_real_connections() {
    let upstream = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
        .expect(1)
        .mount(&upstream)
        .await;

    let config = RelayConfig {
        port: 0,
        ..RelayConfig::default()
    };
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let (addr, server) = aqi_relay::bind(&config, "test-key", async {
        let _ = shutdown_rx.await;
    })
    .unwrap();
    let handle = tokio::spawn(server);

    let url = format!(
        "http://{}{}",
        addr,
        relay_path(&format!("{}/ping", upstream.uri()))
    );
    let body = reqwest::get(&url).await.unwrap().text().await.unwrap();
    assert_eq!(body, "pong");

    shutdown_tx.send(()).unwrap();
    handle.await.unwrap();
}
