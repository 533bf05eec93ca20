//! Failure taxonomy for backend requests.
//!
//! Cancellation is its own variant: a user-initiated abort must be
//! distinguishable from real failures so UI code can suppress it.

use thiserror::Error;

/// Everything that can go wrong talking to a provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The configured endpoint is not a syntactically valid URL.
    /// Raised before any network traffic.
    #[error("invalid endpoint URL: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    /// The server answered with a non-success status.
    #[error("HTTP {status}")]
    Status { status: u16 },

    /// The request failed at the transport level (DNS, connect, TLS, ...).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body could not be decoded.
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The event stream broke mid-generation.
    #[error("stream error: {0}")]
    Stream(String),

    /// The caller aborted the request via its cancellation token.
    #[error("request cancelled")]
    Cancelled,
}

impl ProviderError {
    /// Whether this failure is a user-initiated abort rather than an error.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ProviderError::Cancelled)
    }
}
