//! Settings panel logic — provider switch side effects and field rules.
//!
//! Everything here is driven by the registry row for the target provider, so
//! the panel renders and rewrites per-provider behavior without its own
//! switch statements.

use url::Url;

use quillpad_core::{Provider, SessionSettings};
use quillpad_providers::registry::{self, EndpointRewrite, ModelSelector};

/// Switch the session to another provider, applying that provider's side
/// effects to the settings.
///
/// The endpoint field is rewritten deterministically per the registry row,
/// and the chat-style flag is forced off unless the row keeps it. If the
/// current endpoint is not a valid URL the switch aborts silently: no state
/// changes at all.
pub fn switch_provider(settings: &mut SessionSettings, next: Provider) {
    let Ok(url) = Url::parse(settings.endpoint()) else {
        return;
    };
    let spec = registry::spec(next);

    let url = match spec.switch_rewrite {
        EndpointRewrite::LocalPort(port) => {
            let mut url = coerce_http(url);
            let _ = url.set_port(Some(port));
            url
        }
        EndpointRewrite::CoerceScheme => coerce_http(url),
        EndpointRewrite::Keep => url,
        EndpointRewrite::FixedHost { scheme, host } => {
            let mut url = url;
            let _ = url.set_scheme(scheme);
            let _ = url.set_host(Some(host));
            let _ = url.set_port(None);
            url
        }
    };

    if !spec.keeps_chat_mode {
        settings.set_chat_mode(false);
    }
    settings.set_endpoint(url.to_string());
    settings.set_provider(next);
}

/// Force a non-HTTP scheme to `http`, leaving HTTP(S) URLs alone.
fn coerce_http(url: Url) -> Url {
    if matches!(url.scheme(), "http" | "https") {
        return url;
    }
    // The url crate refuses cross-category scheme changes, so rebuild.
    let raw = url.as_str();
    let rebuilt = raw
        .split_once("://")
        .map(|(_, rest)| format!("http://{rest}"))
        .unwrap_or_else(|| format!("http://{}", url.path()));
    Url::parse(&rebuilt).unwrap_or(url)
}

// ─────────────────────────────────────────────
// Field rules
// ─────────────────────────────────────────────

/// Whether the server field rejects edits for this provider.
pub fn server_field_locked(provider: Provider) -> bool {
    registry::spec(provider).server_field_locked
}

/// The value the server field displays: the fixed base for pool/gateway
/// providers, the stored endpoint otherwise.
pub fn server_field_value<'a>(settings: &'a SessionSettings) -> &'a str {
    registry::spec(settings.provider())
        .server_display
        .unwrap_or_else(|| settings.endpoint())
}

/// Whether the key field lives in the sidebar (pool/gateway providers keep
/// theirs in their own dialog).
pub fn sidebar_key_field(provider: Provider) -> bool {
    registry::spec(provider).sidebar_key_field
}

/// Which kind of model selector the panel renders.
pub fn model_selector(provider: Provider) -> ModelSelector {
    registry::spec(provider).model_selector
}

/// The model field's display value: the pool shows "Any" when nothing is
/// selected, the gateway shows "None".
pub fn model_field_value(settings: &SessionSettings) -> &str {
    if !settings.model().is_empty() {
        return settings.model();
    }
    match settings.provider() {
        Provider::AiHorde => "Any",
        Provider::OpenRouter => "None",
        _ => "",
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
