//! Cancellable streams of generated text fragments.
//!
//! [`TokenStream`] is the one shape every completion handler returns: a lazy
//! sequence of incremental fragments that ends when the transport closes or
//! the cancellation token fires. Cancelling drops the underlying connection
//! on every exit path, so the server stops generating instead of talking to
//! a discarded buffer.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use eventsource_stream::Eventsource;
use futures_util::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;

use quillpad_core::ProviderError;

/// One item of a completion stream.
pub type Fragment = Result<String, ProviderError>;

type BoxFragmentStream = Pin<Box<dyn Stream<Item = Fragment> + Send>>;

/// A lazy, cancellable stream of text fragments.
pub struct TokenStream {
    inner: BoxFragmentStream,
    cancel: CancellationToken,
}

impl std::fmt::Debug for TokenStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStream").finish_non_exhaustive()
    }
}

impl TokenStream {
    /// A stream that ends immediately. Used for provider/mode combinations
    /// that produce no output.
    pub fn empty() -> Self {
        TokenStream {
            inner: Box::pin(futures_util::stream::empty()),
            cancel: CancellationToken::new(),
        }
    }

    /// Bind a fragment stream to a cancellation token: the token ends
    /// consumption and drops the transport.
    pub(crate) fn wrap<S>(cancel: CancellationToken, stream: S) -> Self
    where
        S: Stream<Item = Fragment> + Send + 'static,
    {
        let guard = cancel.clone();
        let inner = async_stream::stream! {
            let mut stream = Box::pin(stream);
            loop {
                tokio::select! {
                    _ = guard.cancelled() => break,
                    item = stream.next() => {
                        let Some(item) = item else { break };
                        yield item;
                    }
                }
            }
        };
        TokenStream {
            inner: Box::pin(inner),
            cancel,
        }
    }

    /// Like [`TokenStream::wrap`], but runs `cleanup` on the cancel path
    /// before ending — for backends that need a side-channel request to
    /// actually stop generating (abort route, queue withdrawal).
    pub(crate) fn wrap_with_cleanup<S, F>(cancel: CancellationToken, stream: S, cleanup: F) -> Self
    where
        S: Stream<Item = Fragment> + Send + 'static,
        F: Future<Output = ()> + Send + 'static,
    {
        let guard = cancel.clone();
        let inner = async_stream::stream! {
            let mut stream = Box::pin(stream);
            loop {
                tokio::select! {
                    _ = guard.cancelled() => {
                        cleanup.await;
                        break;
                    }
                    item = stream.next() => {
                        let Some(item) = item else { break };
                        yield item;
                    }
                }
            }
        };
        TokenStream {
            inner: Box::pin(inner),
            cancel,
        }
    }

    /// Request cancellation. The underlying connection is released.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// A token that can cancel this stream from another task.
    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl Stream for TokenStream {
    type Item = Fragment;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

// ─────────────────────────────────────────────
// SSE plumbing
// ─────────────────────────────────────────────

/// Issue a streaming POST and hand back the response once headers arrive.
///
/// Fails with [`ProviderError::Status`] on a non-success status and with
/// [`ProviderError::Cancelled`] when the token fires during the handshake.
pub(crate) async fn post_sse<B: serde::Serialize>(
    client: &reqwest::Client,
    url: &str,
    headers: reqwest::header::HeaderMap,
    body: &B,
    cancel: &CancellationToken,
) -> Result<reqwest::Response, ProviderError> {
    let send = client
        .post(url)
        .headers(headers)
        .header(reqwest::header::ACCEPT, "text/event-stream")
        .json(body)
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
    Ok(response)
}

/// What a decoded SSE event means for the fragment stream.
pub(crate) enum SseUpdate {
    /// Yield this fragment.
    Fragment(String),
    /// Yield this fragment, then end the stream.
    Last(String),
    /// Nothing to yield for this event.
    Skip,
    /// End the stream.
    Done,
}

/// Turn an SSE response body into a fragment stream, decoding each event's
/// `data` payload with `decode`.
pub(crate) fn sse_fragments<D>(
    response: reqwest::Response,
    decode: D,
) -> impl Stream<Item = Fragment> + Send
where
    D: Fn(&str) -> Result<SseUpdate, ProviderError> + Send + 'static,
{
    async_stream::stream! {
        let mut events = response.bytes_stream().eventsource();
        while let Some(event) = events.next().await {
            match event {
                Ok(event) => match decode(&event.data) {
                    Ok(SseUpdate::Fragment(text)) => {
                        if !text.is_empty() {
                            yield Ok(text);
                        }
                    }
                    Ok(SseUpdate::Last(text)) => {
                        if !text.is_empty() {
                            yield Ok(text);
                        }
                        break;
                    }
                    Ok(SseUpdate::Skip) => {}
                    Ok(SseUpdate::Done) => break,
                    Err(e) => {
                        yield Err(e);
                        break;
                    }
                },
                Err(e) => {
                    yield Err(ProviderError::Stream(e.to_string()));
                    break;
                }
            }
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
