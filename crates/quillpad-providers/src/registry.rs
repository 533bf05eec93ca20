//! Provider registry — static specs for the five supported backends.
//!
//! Each `ProviderSpec` is one table row describing everything the rest of the
//! workspace needs to know about a backend: how its endpoint normalizes, what
//! it can do, what switching to it does to the settings panel, and which
//! panel fields it shows. Adding a backend means adding one row here.

use quillpad_core::Provider;

/// Fixed base URL of the AI Horde community pool. Not user-configurable.
pub const HORDE_BASE: &str = "https://aihorde.net/api";

/// Fixed base URL of the OpenRouter aggregation gateway. Not user-configurable.
pub const OPENROUTER_BASE: &str = "https://openrouter.ai/api";

// ─────────────────────────────────────────────
// ProviderSpec — static metadata for one backend
// ─────────────────────────────────────────────

/// Static specification describing one backend.
#[derive(Clone, Debug)]
pub struct ProviderSpec {
    /// Which provider this row describes.
    pub provider: Provider,
    /// Human-readable name for the panel and logs.
    pub display_name: &'static str,

    // ── endpoint normalization ──
    /// Path suffix stripped from the user's URL (e.g. `"/v1"`).
    pub strip_suffix: Option<&'static str>,
    /// Canonical base that overrides the user's URL entirely.
    pub fixed_base: Option<&'static str>,

    // ── capabilities ──
    /// Whether the backend serves a model catalog.
    pub lists_models: bool,
    /// Whether the backend accepts chat-style requests.
    pub chat_capable: bool,

    // ── provider switch side effects ──
    /// How the endpoint field is rewritten when the user switches here.
    pub switch_rewrite: EndpointRewrite,
    /// Whether the chat-style flag survives the switch. Every other row
    /// forces it off.
    pub keeps_chat_mode: bool,

    // ── panel field rules ──
    /// Server field is read-only for this backend.
    pub server_field_locked: bool,
    /// Value shown in the server field instead of the stored endpoint.
    pub server_display: Option<&'static str>,
    /// Key field lives in the sidebar (as opposed to the backend's own dialog).
    pub sidebar_key_field: bool,
    /// Which kind of model selector the panel renders.
    pub model_selector: ModelSelector,
}

/// Endpoint rewrite applied when the user switches to a provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndpointRewrite {
    /// Coerce non-HTTP schemes to `http` and force this port.
    LocalPort(u16),
    /// Coerce non-HTTP schemes to `http`; host and port stay.
    CoerceScheme,
    /// Leave the stored endpoint untouched.
    Keep,
    /// Force scheme and host, clear the port. Path stays.
    FixedHost {
        scheme: &'static str,
        host: &'static str,
    },
}

/// Kind of model selector the panel renders for a provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelSelector {
    /// No model field; the server decides.
    None,
    /// Free-text field with catalog suggestions.
    FreeText,
    /// Read-only field plus the pool's own picker dialog.
    PoolPicker,
    /// Read-only field plus the gateway catalog picker dialog.
    CatalogPicker,
}

// ─────────────────────────────────────────────
// The five backends
// ─────────────────────────────────────────────

/// Complete list of backend specifications, in panel order.
pub static PROVIDERS: &[ProviderSpec] = &[
    ProviderSpec {
        provider: Provider::LlamaCpp,
        display_name: "llama.cpp",
        strip_suffix: None,
        fixed_base: None,
        lists_models: false,
        chat_capable: false,
        switch_rewrite: EndpointRewrite::LocalPort(8080),
        keeps_chat_mode: false,
        server_field_locked: false,
        server_display: None,
        sidebar_key_field: true,
        model_selector: ModelSelector::None,
    },
    ProviderSpec {
        provider: Provider::KoboldCpp,
        display_name: "KoboldCpp",
        strip_suffix: Some("/api"),
        fixed_base: None,
        lists_models: false,
        chat_capable: false,
        switch_rewrite: EndpointRewrite::LocalPort(5001),
        keeps_chat_mode: false,
        server_field_locked: false,
        server_display: None,
        sidebar_key_field: true,
        model_selector: ModelSelector::None,
    },
    ProviderSpec {
        provider: Provider::OpenAiCompat,
        display_name: "OpenAI Compatible",
        strip_suffix: Some("/v1"),
        fixed_base: None,
        lists_models: true,
        chat_capable: true,
        switch_rewrite: EndpointRewrite::CoerceScheme,
        keeps_chat_mode: true,
        server_field_locked: false,
        server_display: None,
        sidebar_key_field: true,
        model_selector: ModelSelector::FreeText,
    },
    ProviderSpec {
        provider: Provider::AiHorde,
        display_name: "AI Horde",
        strip_suffix: None,
        fixed_base: Some(HORDE_BASE),
        lists_models: true,
        chat_capable: false,
        switch_rewrite: EndpointRewrite::Keep,
        keeps_chat_mode: false,
        server_field_locked: true,
        server_display: Some(HORDE_BASE),
        sidebar_key_field: false,
        model_selector: ModelSelector::PoolPicker,
    },
    ProviderSpec {
        provider: Provider::OpenRouter,
        display_name: "OpenRouter",
        strip_suffix: None,
        fixed_base: Some(OPENROUTER_BASE),
        lists_models: true,
        chat_capable: true,
        switch_rewrite: EndpointRewrite::FixedHost {
            scheme: "https",
            host: "openrouter.ai",
        },
        keeps_chat_mode: false,
        server_field_locked: true,
        server_display: Some(OPENROUTER_BASE),
        sidebar_key_field: false,
        model_selector: ModelSelector::CatalogPicker,
    },
];

/// Look up the spec row for a provider.
pub fn spec(provider: Provider) -> &'static ProviderSpec {
    PROVIDERS
        .iter()
        .find(|s| s.provider == provider)
        .expect("every provider has a registry row")
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
