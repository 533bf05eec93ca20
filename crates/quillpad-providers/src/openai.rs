//! Generic handlers for OpenAI-compatible backends.
//!
//! Raw completions stream from `/v1/completions`, chat completions from
//! `/v1/chat/completions`. Both use SSE with incremental choice deltas and a
//! literal `[DONE]` sentinel, and both honor the proxy sidecar-header policy.
//! The aggregation gateway shares this wire format, so the dispatcher routes
//! it here for generation.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use quillpad_core::{ChatMessage, ChatRequest, CompletionRequest, ProviderError, SessionSettings};

use crate::headers::wire_headers;
use crate::stream::{post_sse, sse_fragments, SseUpdate, TokenStream};

// ─────────────────────────────────────────────
// Request bodies
// ─────────────────────────────────────────────

#[derive(Serialize)]
struct CompletionBody<'a> {
    #[serde(skip_serializing_if = "str::is_empty")]
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    stop: &'a [String],
    stream: bool,
}

#[derive(Serialize)]
struct ChatBody<'a> {
    #[serde(skip_serializing_if = "str::is_empty")]
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    stop: &'a [String],
    stream: bool,
}

// ─────────────────────────────────────────────
// Stream chunks
// ─────────────────────────────────────────────

#[derive(Deserialize)]
struct CompletionChunk {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ChatChunk {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Default)]
struct ChatChoice {
    #[serde(default)]
    delta: ChatDelta,
}

#[derive(Deserialize, Default)]
struct ChatDelta {
    #[serde(default)]
    content: Option<String>,
}

// ─────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────

/// Stream a raw completion from `{proxy ?? base}/v1/completions`.
pub async fn completion(
    client: &Client,
    base: &str,
    settings: &SessionSettings,
    request: &CompletionRequest,
    cancel: CancellationToken,
) -> Result<TokenStream, ProviderError> {
    let target = settings.proxy_endpoint().unwrap_or(base);
    let url = format!("{}/v1/completions", target.trim_end_matches('/'));
    let headers = wire_headers(settings.api_key(), base, settings.proxy_endpoint().is_some());

    let body = CompletionBody {
        model: settings.model(),
        prompt: &request.prompt,
        max_tokens: request.params.max_tokens,
        temperature: request.params.temperature,
        top_p: request.params.top_p,
        stop: &request.params.stop,
        stream: true,
    };

    debug!(url = %url, model = settings.model(), "starting completion stream");
    let response = post_sse(client, &url, headers, &body, &cancel).await?;
    let fragments = sse_fragments(response, decode_completion_event);
    Ok(TokenStream::wrap(cancel, fragments))
}

/// Stream a chat completion from `{proxy ?? base}/v1/chat/completions`.
pub async fn chat_completion(
    client: &Client,
    base: &str,
    settings: &SessionSettings,
    request: &ChatRequest,
    cancel: CancellationToken,
) -> Result<TokenStream, ProviderError> {
    let target = settings.proxy_endpoint().unwrap_or(base);
    let url = format!("{}/v1/chat/completions", target.trim_end_matches('/'));
    let headers = wire_headers(settings.api_key(), base, settings.proxy_endpoint().is_some());

    let body = ChatBody {
        model: settings.model(),
        messages: &request.messages,
        max_tokens: request.params.max_tokens,
        temperature: request.params.temperature,
        top_p: request.params.top_p,
        stop: &request.params.stop,
        stream: true,
    };

    debug!(url = %url, model = settings.model(), "starting chat completion stream");
    let response = post_sse(client, &url, headers, &body, &cancel).await?;
    let fragments = sse_fragments(response, decode_chat_event);
    Ok(TokenStream::wrap(cancel, fragments))
}

fn decode_completion_event(data: &str) -> Result<SseUpdate, ProviderError> {
    if data.trim() == "[DONE]" {
        return Ok(SseUpdate::Done);
    }
    let chunk: CompletionChunk = serde_json::from_str(data)?;
    Ok(match chunk.choices.into_iter().next() {
        Some(choice) => SseUpdate::Fragment(choice.text),
        None => SseUpdate::Skip,
    })
}

fn decode_chat_event(data: &str) -> Result<SseUpdate, ProviderError> {
    if data.trim() == "[DONE]" {
        return Ok(SseUpdate::Done);
    }
    let chunk: ChatChunk = serde_json::from_str(data)?;
    Ok(match chunk.choices.into_iter().next().and_then(|c| c.delta.content) {
        Some(text) => SseUpdate::Fragment(text),
        None => SseUpdate::Skip,
    })
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use quillpad_core::GenerationParams;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sse_body(events: &[&str]) -> String {
        events
            .iter()
            .map(|e| format!("data: {e}\n\n"))
            .collect::<String>()
    }

    fn settings_for(server: &MockServer) -> SessionSettings {
        let mut settings = SessionSettings::default();
        settings.set_endpoint(server.uri());
        settings.set_api_key("sk-test");
        settings.set_model("gpt-4");
        settings
    }

    async fn collect(mut stream: TokenStream) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(fragment) = stream.next().await {
            out.push(fragment.unwrap());
        }
        out
    }

    #[tokio::test]
    async fn test_completion_streams_fragments_until_done() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4",
                "prompt": "Once",
                "stream": true
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_raw(
                        sse_body(&[
                            r#"{"choices":[{"text":" upon"}]}"#,
                            r#"{"choices":[{"text":" a time"}]}"#,
                            "[DONE]",
                        ]),
                        "text/event-stream",
                    ),
            )
            .mount(&server)
            .await;

        let settings = settings_for(&server);
        let stream = completion(
            &Client::new(),
            &server.uri(),
            &settings,
            &CompletionRequest::new("Once"),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(collect(stream).await, vec![" upon", " a time"]);
    }

    #[tokio::test]
    async fn test_chat_streams_delta_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_raw(
                        sse_body(&[
                            // role-only delta carries no text
                            r#"{"choices":[{"delta":{"role":"assistant"}}]}"#,
                            r#"{"choices":[{"delta":{"content":"Hi"}}]}"#,
                            r#"{"choices":[{"delta":{"content":" there"}}]}"#,
                            "[DONE]",
                        ]),
                        "text/event-stream",
                    ),
            )
            .mount(&server)
            .await;

        let settings = settings_for(&server);
        let stream = chat_completion(
            &Client::new(),
            &server.uri(),
            &settings,
            &ChatRequest::new(vec![ChatMessage::user("Hello")]),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(collect(stream).await, vec!["Hi", " there"]);
    }

    #[tokio::test]
    async fn test_error_status_fails_with_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/completions"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let settings = settings_for(&server);
        let err = completion(
            &Client::new(),
            &server.uri(),
            &settings,
            &CompletionRequest::new("x"),
            CancellationToken::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ProviderError::Status { status: 429 }));
    }

    #[tokio::test]
    async fn test_proxied_completion_targets_relay() {
        let relay = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/completions"))
            .and(header("X-Real-Authorization", "Bearer sk-test"))
            .and(header("X-Real-URL", "https://real.example.com"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_raw(
                        sse_body(&[r#"{"choices":[{"text":"ok"}]}"#, "[DONE]"]),
                        "text/event-stream",
                    ),
            )
            .mount(&relay)
            .await;

        let mut settings = SessionSettings::default();
        settings.set_api_key("sk-test");
        settings.set_proxy_endpoint(Some(relay.uri()));

        let stream = completion(
            &Client::new(),
            "https://real.example.com",
            &settings,
            &CompletionRequest::new("x"),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(collect(stream).await, vec!["ok"]);
    }

    #[tokio::test]
    async fn test_malformed_chunk_surfaces_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_raw(sse_body(&["{not json"]), "text/event-stream"),
            )
            .mount(&server)
            .await;

        let settings = settings_for(&server);
        let mut stream = completion(
            &Client::new(),
            &server.uri(),
            &settings,
            &CompletionRequest::new("x"),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        let err = stream.next().await.unwrap().unwrap_err();
        assert!(matches!(err, ProviderError::Decode(_)));
        assert!(stream.next().await.is_none());
    }

    #[test]
    fn test_body_omits_unset_fields() {
        let body = CompletionBody {
            model: "",
            prompt: "p",
            max_tokens: 64,
            temperature: None,
            top_p: None,
            stop: &[],
            stream: true,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("model").is_none());
        assert!(json.get("temperature").is_none());
        assert!(json.get("stop").is_none());
        assert_eq!(json["max_tokens"], 64);
    }

    #[test]
    fn test_generation_params_flow_into_body() {
        let params = GenerationParams {
            max_tokens: 128,
            temperature: Some(0.8),
            top_p: Some(0.95),
            stop: vec!["\n".to_string()],
        };
        let body = CompletionBody {
            model: "m",
            prompt: "p",
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            top_p: params.top_p,
            stop: &params.stop,
            stream: true,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["temperature"], 0.8);
        assert_eq!(json["stop"][0], "\n");
    }
}
