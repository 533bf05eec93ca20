//! llama.cpp server handler.
//!
//! Streams from `POST {base}/completion`. Events carry `{content, stop}`;
//! a `stop: true` event ends the stream after its fragment.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use quillpad_core::{CompletionRequest, ProviderError, SessionSettings};

use crate::headers::wire_headers;
use crate::stream::{post_sse, sse_fragments, SseUpdate, TokenStream};

#[derive(Serialize)]
struct LlamaBody<'a> {
    prompt: &'a str,
    n_predict: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    stop: &'a [String],
    stream: bool,
}

#[derive(Deserialize)]
struct LlamaChunk {
    #[serde(default)]
    content: String,
    #[serde(default)]
    stop: bool,
}

/// Stream a raw completion from a llama.cpp server.
pub async fn completion(
    client: &Client,
    base: &str,
    settings: &SessionSettings,
    request: &CompletionRequest,
    cancel: CancellationToken,
) -> Result<TokenStream, ProviderError> {
    let url = format!("{base}/completion");
    let headers = wire_headers(settings.api_key(), base, false);

    let body = LlamaBody {
        prompt: &request.prompt,
        n_predict: request.params.max_tokens,
        temperature: request.params.temperature,
        top_p: request.params.top_p,
        stop: &request.params.stop,
        stream: true,
    };

    debug!(url = %url, "starting llama.cpp completion stream");
    let response = post_sse(client, &url, headers, &body, &cancel).await?;
    let fragments = sse_fragments(response, decode_event);
    Ok(TokenStream::wrap(cancel, fragments))
}

fn decode_event(data: &str) -> Result<SseUpdate, ProviderError> {
    let chunk: LlamaChunk = serde_json::from_str(data)?;
    Ok(if chunk.stop {
        SseUpdate::Last(chunk.content)
    } else {
        SseUpdate::Fragment(chunk.content)
    })
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
