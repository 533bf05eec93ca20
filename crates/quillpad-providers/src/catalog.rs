//! Model catalog fetch over the OpenAI-compatible wire.
//!
//! Serves both the generic provider and the aggregation gateway; the two
//! speak the same `/v1/models` format.

use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use quillpad_core::{ModelDescriptor, ModelList, ProviderError};

use crate::headers::wire_headers;

/// Fetch the model catalog from `{proxy ?? endpoint}/v1/models`.
///
/// `endpoint` must already be normalized. With a proxy base, the key and the
/// real target travel in sidecar headers; otherwise the key goes out as a
/// bearer `Authorization` header. A fired token aborts the request and maps
/// to [`ProviderError::Cancelled`].
pub async fn fetch_models(
    client: &Client,
    endpoint: &str,
    api_key: Option<&str>,
    proxy: Option<&str>,
    cancel: &CancellationToken,
) -> Result<Vec<ModelDescriptor>, ProviderError> {
    let base = proxy.unwrap_or(endpoint);
    let url = format!("{}/v1/models", base.trim_end_matches('/'));
    let headers = wire_headers(api_key, endpoint, proxy.is_some());

    debug!(url = %url, proxied = proxy.is_some(), "fetching model catalog");

    let send = client.get(&url).headers(headers).send();
    let response = tokio::select! {
        _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
        result = send => result?,
    };

    let status = response.status();
    if !status.is_success() {
        warn!(status = status.as_u16(), "catalog fetch failed");
        return Err(ProviderError::Status {
            status: status.as_u16(),
        });
    }

    let list = tokio::select! {
        _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
        body = response.json::<ModelList>() => body?,
    };

    debug!(models = list.data.len(), "catalog fetched");
    Ok(list.data)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> Client {
        Client::new()
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .and(header("Authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    { "id": "gpt-4", "context_length": 8192 },
                    { "id": "gpt-3.5-turbo" }
                ]
            })))
            .mount(&server)
            .await;

        let models = fetch_models(
            &client(),
            &server.uri(),
            Some("sk-test"),
            None,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(models.len(), 2);
        assert_eq!(models[0].id, "gpt-4");
        assert_eq!(models[0].context_length, Some(8192));
    }

    #[tokio::test]
    async fn test_missing_data_field_is_empty_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let models = fetch_models(&client(), &server.uri(), None, None, &CancellationToken::new())
            .await
            .unwrap();
        assert!(models.is_empty());
    }

    #[tokio::test]
    async fn test_unauthorized_carries_status_code() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = fetch_models(&client(), &server.uri(), None, None, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Status { status: 401 }));
        assert_eq!(err.to_string(), "HTTP 401");
    }

    #[tokio::test]
    async fn test_proxied_fetch_uses_sidecar_headers() {
        let relay = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .and(header("X-Real-Authorization", "Bearer sk-test"))
            .and(header("X-Real-URL", "https://real.example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [ { "id": "relayed" } ]
            })))
            .mount(&relay)
            .await;

        // The request goes to the relay, not the real endpoint.
        let models = fetch_models(
            &client(),
            "https://real.example.com",
            Some("sk-test"),
            Some(&relay.uri()),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(models.len(), 1);
        assert_eq!(models[0].id, "relayed");
    }

    #[tokio::test]
    async fn test_cancellation_aborts_in_flight_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(30))
                    .set_body_json(serde_json::json!({ "data": [] })),
            )
            .mount(&server)
            .await;

        let cancel = CancellationToken::new();
        let aborter = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            aborter.cancel();
        });

        let start = std::time::Instant::now();
        let err = fetch_models(&client(), &server.uri(), None, None, &cancel)
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
