//! Provider dispatch — the three public entry points.
//!
//! Each normalizes the endpoint first, then follows the registry row for the
//! configured provider. Capabilities live in the table, so a provider/mode
//! combination with no handler resolves to an empty result instead of being
//! re-decided at every call site.

use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use quillpad_core::{
    ChatRequest, CompletionRequest, ModelDescriptor, Provider, ProviderError, SessionSettings,
};

use crate::endpoint::normalize_endpoint;
use crate::stream::TokenStream;
use crate::{catalog, horde, kobold_cpp, llama_cpp, openai, registry};

/// List the models the configured provider serves.
///
/// Providers without a catalog yield an empty list, not an error.
pub async fn list_models(
    client: &Client,
    settings: &SessionSettings,
    cancel: &CancellationToken,
) -> Result<Vec<ModelDescriptor>, ProviderError> {
    let provider = settings.provider();
    let base = normalize_endpoint(settings.endpoint(), provider)?;

    if !registry::spec(provider).lists_models {
        return Ok(Vec::new());
    }

    match provider {
        Provider::OpenAiCompat | Provider::OpenRouter => {
            catalog::fetch_models(
                client,
                &base,
                settings.api_key(),
                settings.proxy_endpoint(),
                cancel,
            )
            .await
        }
        Provider::AiHorde => horde::list(client, &base, cancel).await,
        Provider::LlamaCpp | Provider::KoboldCpp => Ok(Vec::new()),
    }
}

/// Stream a raw (non-chat) completion from the configured provider.
pub async fn completion(
    client: &Client,
    settings: &SessionSettings,
    request: &CompletionRequest,
    cancel: CancellationToken,
) -> Result<TokenStream, ProviderError> {
    let provider = settings.provider();
    let base = normalize_endpoint(settings.endpoint(), provider)?;

    match provider {
        Provider::LlamaCpp => llama_cpp::completion(client, &base, settings, request, cancel).await,
        Provider::KoboldCpp => {
            kobold_cpp::completion(client, &base, settings, request, cancel).await
        }
        Provider::OpenAiCompat | Provider::OpenRouter => {
            openai::completion(client, &base, settings, request, cancel).await
        }
        Provider::AiHorde => horde::completion(client, &base, settings, request, cancel).await,
    }
}

/// Stream a chat completion from the configured provider.
///
/// Providers without chat support yield an empty stream; callers treat that
/// as "no output".
pub async fn chat_completion(
    client: &Client,
    settings: &SessionSettings,
    request: &ChatRequest,
    cancel: CancellationToken,
) -> Result<TokenStream, ProviderError> {
    let provider = settings.provider();
    let base = normalize_endpoint(settings.endpoint(), provider)?;

    if !registry::spec(provider).chat_capable {
        debug!(provider = %provider, "chat-style requests not supported, yielding no output");
        return Ok(TokenStream::empty());
    }

    openai::chat_completion(client, &base, settings, request, cancel).await
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
