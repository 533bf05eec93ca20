//! Authorization header policy for OpenAI-wire requests.
//!
//! Direct mode sends the key as a standard bearer `Authorization` header.
//! Proxied mode moves the key and the real target URL into sidecar headers
//! so the relay can substitute its own credentials.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tracing::warn;

/// Sidecar header carrying the real bearer key through a relay.
pub const REAL_AUTHORIZATION: HeaderName = HeaderName::from_static("x-real-authorization");

/// Sidecar header carrying the real target URL through a relay.
pub const REAL_URL: HeaderName = HeaderName::from_static("x-real-url");

/// Build the header set for an OpenAI-wire request.
///
/// `endpoint` is the normalized real target, used only in proxied mode.
pub fn wire_headers(api_key: Option<&str>, endpoint: &str, proxied: bool) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    if proxied {
        if let Some(key) = api_key {
            match HeaderValue::from_str(&format!("Bearer {key}")) {
                Ok(value) => {
                    headers.insert(REAL_AUTHORIZATION, value);
                }
                Err(_) => warn!("API key is not a valid header value, skipping"),
            }
        }
        match HeaderValue::from_str(endpoint) {
            Ok(value) => {
                headers.insert(REAL_URL, value);
            }
            Err(_) => warn!("endpoint is not a valid header value, skipping"),
        }
    } else if let Some(key) = api_key {
        match HeaderValue::from_str(&format!("Bearer {key}")) {
            Ok(value) => {
                headers.insert(AUTHORIZATION, value);
            }
            Err(_) => warn!("API key is not a valid header value, skipping"),
        }
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_mode_uses_bearer_authorization() {
        let headers = wire_headers(Some("sk-123"), "https://api.example.com", false);
        assert_eq!(headers[AUTHORIZATION], "Bearer sk-123");
        assert!(!headers.contains_key(REAL_AUTHORIZATION));
        assert!(!headers.contains_key(REAL_URL));
    }

    #[test]
    fn test_direct_mode_without_key_sends_no_auth() {
        let headers = wire_headers(None, "https://api.example.com", false);
        assert!(!headers.contains_key(AUTHORIZATION));
    }

    #[test]
    fn test_proxied_mode_uses_sidecar_headers() {
        let headers = wire_headers(Some("sk-123"), "https://api.example.com", true);
        assert_eq!(headers[REAL_AUTHORIZATION], "Bearer sk-123");
        assert_eq!(headers[REAL_URL], "https://api.example.com");
        assert!(!headers.contains_key(AUTHORIZATION));
    }

    #[test]
    fn test_proxied_mode_without_key_still_sends_target() {
        let headers = wire_headers(None, "https://api.example.com", true);
        assert!(!headers.contains_key(REAL_AUTHORIZATION));
        assert_eq!(headers[REAL_URL], "https://api.example.com");
    }

    #[test]
    fn test_content_type_always_json() {
        let headers = wire_headers(None, "https://api.example.com", false);
        assert_eq!(headers[CONTENT_TYPE], "application/json");
    }
}
