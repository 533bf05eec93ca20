//! Configuration schema for the CLI binary.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! `#[serde(rename_all = "camelCase")]` handles the conversion.

use serde::{Deserialize, Serialize};

use crate::settings::SessionSettings;
use crate::types::{GenerationParams, Provider};

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.quillpad/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub connection: ConnectionConfig,
    pub generation: GenerationConfig,
}

// ─────────────────────────────────────────────
// Connection
// ─────────────────────────────────────────────

/// Backend connection settings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionConfig {
    /// Which backend to talk to.
    pub provider: Provider,
    /// Server URL as entered; normalized per request.
    pub endpoint: String,
    /// Authorization key. Empty = none.
    pub api_key: String,
    /// Selected model identifier. Empty = server default / any.
    pub model: String,
    /// Relay requests through this base URL using sidecar headers. Empty = direct.
    pub proxy_endpoint: String,
    /// Use the chat-style request shape.
    pub chat_mode: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            provider: Provider::LlamaCpp,
            endpoint: "http://localhost:8080/".to_string(),
            api_key: String::new(),
            model: String::new(),
            proxy_endpoint: String::new(),
            chat_mode: false,
        }
    }
}

impl ConnectionConfig {
    /// Build the in-memory settings context from this config.
    pub fn to_settings(&self) -> SessionSettings {
        let mut settings = SessionSettings::default();
        settings.set_provider(self.provider);
        settings.set_endpoint(self.endpoint.clone());
        settings.set_api_key(self.api_key.clone());
        settings.set_model(self.model.clone());
        settings.set_chat_mode(self.chat_mode);
        settings.set_proxy_endpoint(if self.proxy_endpoint.is_empty() {
            None
        } else {
            Some(self.proxy_endpoint.clone())
        });
        settings
    }
}

// ─────────────────────────────────────────────
// Generation
// ─────────────────────────────────────────────

/// Default sampling parameters for the `generate` command.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationConfig {
    /// Maximum tokens to generate per response.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
    /// Nucleus sampling cutoff. Absent = server default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_tokens: 256,
            temperature: 0.7,
            top_p: None,
        }
    }
}

impl GenerationConfig {
    /// Build request parameters from this config.
    pub fn to_params(&self) -> GenerationParams {
        GenerationParams {
            max_tokens: self.max_tokens,
            temperature: Some(self.temperature),
            top_p: self.top_p,
            stop: Vec::new(),
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
