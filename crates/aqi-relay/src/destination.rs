//! Destination URL extraction from the relay's own request path.

use percent_encoding::percent_decode_str;
use url::Url;

use crate::error::RelayError;

/// Extract the destination embedded after `prefix` in `path`, percent-decode
/// it, and append the inbound query parameters in order.
pub fn destination_url(
    path: &str,
    prefix: &str,
    query: &[(String, String)],
) -> Result<Url, RelayError> {
    let marker = format!("{}/", prefix.trim_matches('/'));

    let encoded = path
        .find(&marker)
        .map(|idx| &path[idx + marker.len()..])
        .filter(|rest| !rest.is_empty())
        .ok_or_else(|| RelayError::BadDestination(path.to_string()))?;

    let decoded = percent_decode_str(encoded)
        .decode_utf8()
        .map_err(|e| RelayError::BadDestination(format!("{}: {}", encoded, e)))?;

    let mut url =
        Url::parse(&decoded).map_err(|e| RelayError::BadDestination(format!("{}: {}", decoded, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(RelayError::BadDestination(format!(
            "unsupported scheme {}",
            url.scheme()
        )));
    }

    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in query {
            pairs.append_pair(key, value);
        }
    }

    Ok(url)
}

/// Value for the outbound `host` header.
pub fn host_header(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = ".netlify/functions/cors/";

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_encoded_destination_with_query() {
        let url = destination_url(
            "/.netlify/functions/cors/https%3A%2F%2Fexample.com%2Fx",
            PREFIX,
            &params(&[("a", "1")]),
        )
        .unwrap();

        assert_eq!(url.as_str(), "https://example.com/x?a=1");
        assert_eq!(host_header(&url).as_deref(), Some("example.com"));
    }

    #[test]
    fn test_unencoded_destination() {
        let url = destination_url(
            "/.netlify/functions/cors/https://api.air-matters.app/place_search",
            PREFIX,
            &params(&[("lang", "en"), ("content", "New York")]),
        )
        .unwrap();

        assert_eq!(
            url.as_str(),
            "https://api.air-matters.app/place_search?lang=en&content=New+York"
        );
    }

    #[test]
    fn test_query_appends_to_existing_query() {
        let url = destination_url(
            "/.netlify/functions/cors/https%3A%2F%2Fexample.com%2Fx%3Fb%3D2",
            PREFIX,
            &params(&[("a", "1")]),
        )
        .unwrap();

        assert_eq!(url.as_str(), "https://example.com/x?b=2&a=1");
    }

    #[test]
    fn test_no_query_leaves_url_untouched() {
        let url = destination_url(
            "/.netlify/functions/cors/https%3A%2F%2Fexample.com%2Fx",
            PREFIX,
            &[],
        )
        .unwrap();

        assert_eq!(url.as_str(), "https://example.com/x");
    }

    #[test]
    fn test_prefix_without_slashes() {
        let url = destination_url("/relay/http%3A%2F%2Flocalhost%3A9000%2Fy", "relay", &[]).unwrap();
        assert_eq!(host_header(&url).as_deref(), Some("localhost:9000"));
    }

    #[test]
    fn test_missing_prefix() {
        let err = destination_url("/somewhere/else", PREFIX, &[]).unwrap_err();
        assert!(matches!(err, RelayError::BadDestination(_)));
    }

    #[test]
    fn test_empty_destination() {
        let err = destination_url("/.netlify/functions/cors/", PREFIX, &[]).unwrap_err();
        assert!(matches!(err, RelayError::BadDestination(_)));
    }

    #[test]
    fn test_relative_destination() {
        let err = destination_url("/.netlify/functions/cors/just-a-path", PREFIX, &[]).unwrap_err();
        assert!(matches!(err, RelayError::BadDestination(_)));
    }

    #[test]
    fn test_non_http_scheme() {
        let err = destination_url(
            "/.netlify/functions/cors/file%3A%2F%2F%2Fetc%2Fpasswd",
            PREFIX,
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, RelayError::BadDestination(_)));
    }
}
