//! AI Horde community pool handler.
//!
//! Generation is queue-based rather than connection-based: submit a request,
//! poll its status until `done`, then yield the generated text. Cancellation
//! withdraws the queued request with a DELETE so pool workers don't keep
//! generating for nobody.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use quillpad_core::{CompletionRequest, ModelDescriptor, ProviderError, SessionSettings};

use crate::stream::TokenStream;

/// Key sent when the user has not configured one; the pool accepts anonymous
/// requests at the lowest priority.
pub const ANONYMOUS_KEY: &str = "0000000000";

const POLL_INTERVAL: Duration = Duration::from_secs(3);

const API_KEY_HEADER: HeaderName = HeaderName::from_static("apikey");

// ─────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────

#[derive(Deserialize)]
struct PoolModel {
    name: String,
}

#[derive(Serialize)]
struct SubmitBody<'a> {
    prompt: &'a str,
    params: SubmitParams,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    models: &'a [String],
}

#[derive(Serialize)]
struct SubmitParams {
    max_length: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop_sequence: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct SubmitResponse {
    id: String,
}

#[derive(Deserialize)]
struct StatusResponse {
    #[serde(default)]
    done: bool,
    #[serde(default)]
    faulted: bool,
    #[serde(default)]
    generations: Vec<Generation>,
}

#[derive(Deserialize)]
struct Generation {
    #[serde(default)]
    text: String,
}

fn auth_headers(api_key: Option<&str>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let key = api_key.unwrap_or(ANONYMOUS_KEY);
    match HeaderValue::from_str(key) {
        Ok(value) => {
            headers.insert(API_KEY_HEADER, value);
        }
        Err(_) => warn!("pool API key is not a valid header value, skipping"),
    }
    headers
}

// ─────────────────────────────────────────────
// Listing
// ─────────────────────────────────────────────

/// List the text models currently served by the pool.
///
/// The pool's `/v2/status/models` shape is its own; entries map onto the
/// shared descriptor with the pool model name as the identifier.
pub async fn list(
    client: &Client,
    base: &str,
    cancel: &CancellationToken,
) -> Result<Vec<ModelDescriptor>, ProviderError> {
    let url = format!("{base}/v2/status/models?type=text");
    debug!(url = %url, "fetching pool model list");

    let send = client.get(&url).send();
    let response = tokio::select! {
        _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
        result = send => result?,
    };

    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::Status {
            status: status.as_u16(),
        });
    }

    let models = tokio::select! {
        _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
        body = response.json::<Vec<PoolModel>>() => body?,
    };

    Ok(models
        .into_iter()
        .map(|m| ModelDescriptor {
            id: m.name,
            ..ModelDescriptor::default()
        })
        .collect())
}

// ─────────────────────────────────────────────
// Generation
// ─────────────────────────────────────────────

/// Submit a generation to the pool and stream its result.
///
/// The returned stream yields the generated text once the queued request
/// completes. Selecting no model leaves the choice to the pool.
pub async fn completion(
    client: &Client,
    base: &str,
    settings: &SessionSettings,
    request: &CompletionRequest,
    cancel: CancellationToken,
) -> Result<TokenStream, ProviderError> {
    let submit_url = format!("{base}/v2/generate/text/async");
    let models: Vec<String> = if settings.model().is_empty() {
        Vec::new()
    } else {
        vec![settings.model().to_string()]
    };
    let body = SubmitBody {
        prompt: &request.prompt,
        params: SubmitParams {
            max_length: request.params.max_tokens,
            temperature: request.params.temperature,
            top_p: request.params.top_p,
            stop_sequence: if request.params.stop.is_empty() {
                None
            } else {
                Some(request.params.stop.clone())
            },
        },
        models: &models,
    };

    debug!(url = %submit_url, models = models.len(), "submitting pool generation");

    let send = client
        .post(&submit_url)
        .headers(auth_headers(settings.api_key()))
        .json(&body)
        .send();
    let response = tokio::select! {
        _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
        result = send => result?,
    };

    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::Status {
            status: status.as_u16(),
        });
    }

    let submitted = tokio::select! {
        _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
        body = response.json::<SubmitResponse>() => body?,
    };
    let status_url = format!("{base}/v2/generate/text/status/{}", submitted.id);
    debug!(id = %submitted.id, "pool generation queued");

    let poll_client = client.clone();
    let poll_url = status_url.clone();
    let fragments = async_stream::stream! {
        loop {
            let response = match poll_client.get(&poll_url).send().await {
                Ok(r) => r,
                Err(e) => {
                    yield Err(ProviderError::from(e));
                    break;
                }
            };
            let status = response.status();
            if !status.is_success() {
                yield Err(ProviderError::Status { status: status.as_u16() });
                break;
            }
            let state: StatusResponse = match response.json().await {
                Ok(s) => s,
                Err(e) => {
                    yield Err(ProviderError::from(e));
                    break;
                }
            };
            if state.faulted {
                yield Err(ProviderError::Stream("pool generation faulted".to_string()));
                break;
            }
            if state.done {
                for generation in state.generations {
                    if !generation.text.is_empty() {
                        yield Ok(generation.text);
                    }
                }
                break;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    };

    let delete_client = client.clone();
    let cleanup = async move {
        debug!(url = %status_url, "withdrawing pool generation");
        let _ = delete_client.delete(&status_url).send().await;
    };
    Ok(TokenStream::wrap_with_cleanup(cancel, fragments, cleanup))
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
