//! KoboldCpp server handler.
//!
//! Streams from `POST {base}/api/extra/generate/stream`; events carry
//! `{token}`. Cancellation additionally fires a best-effort
//! `POST {base}/api/extra/abort` so the server stops generating instead of
//! finishing into a closed socket.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use quillpad_core::{CompletionRequest, ProviderError, SessionSettings};

use crate::headers::wire_headers;
use crate::stream::{post_sse, sse_fragments, SseUpdate, TokenStream};

#[derive(Serialize)]
struct KoboldBody<'a> {
    prompt: &'a str,
    max_length: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    stop_sequence: &'a [String],
}

#[derive(Deserialize)]
struct KoboldChunk {
    #[serde(default)]
    token: String,
}

/// Stream a raw completion from a KoboldCpp server.
pub async fn completion(
    client: &Client,
    base: &str,
    settings: &SessionSettings,
    request: &CompletionRequest,
    cancel: CancellationToken,
) -> Result<TokenStream, ProviderError> {
    let url = format!("{base}/api/extra/generate/stream");
    let headers = wire_headers(settings.api_key(), base, false);

    let body = KoboldBody {
        prompt: &request.prompt,
        max_length: request.params.max_tokens,
        temperature: request.params.temperature,
        top_p: request.params.top_p,
        stop_sequence: &request.params.stop,
    };

    debug!(url = %url, "starting KoboldCpp completion stream");
    let response = post_sse(client, &url, headers, &body, &cancel).await?;
    let fragments = sse_fragments(response, decode_event);

    let abort_client = client.clone();
    let abort_url = format!("{base}/api/extra/abort");
    let cleanup = async move {
        debug!(url = %abort_url, "aborting KoboldCpp generation");
        let _ = abort_client.post(&abort_url).send().await;
    };
    Ok(TokenStream::wrap_with_cleanup(cancel, fragments, cleanup))
}

fn decode_event(data: &str) -> Result<SseUpdate, ProviderError> {
    let chunk: KoboldChunk = serde_json::from_str(data)?;
    Ok(SseUpdate::Fragment(chunk.token))
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
