//! Shared session settings — the single context object for connection state.
//!
//! The settings panel and the model picker both read and write this through
//! its accessor/mutator pairs; nothing in the workspace keeps connection
//! state anywhere else.

use serde::{Deserialize, Serialize};

use crate::types::Provider;

/// Connection settings shared by the whole editor session.
///
/// `api_key` and `model` use the empty string for "unset", mirroring how the
/// settings panel treats its input fields.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionSettings {
    endpoint: String,
    provider: Provider,
    api_key: String,
    model: String,
    chat_mode: bool,
    proxy_endpoint: Option<String>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080/".to_string(),
            provider: Provider::LlamaCpp,
            api_key: String::new(),
            model: String::new(),
            chat_mode: false,
            proxy_endpoint: None,
        }
    }
}

impl SessionSettings {
    /// Raw endpoint as the user typed it (normalization happens per request).
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn set_endpoint(&mut self, endpoint: impl Into<String>) {
        self.endpoint = endpoint.into();
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn set_provider(&mut self, provider: Provider) {
        self.provider = provider;
    }

    /// Authorization key; `None` when the field is empty.
    pub fn api_key(&self) -> Option<&str> {
        if self.api_key.is_empty() {
            None
        } else {
            Some(&self.api_key)
        }
    }

    pub fn set_api_key(&mut self, key: impl Into<String>) {
        self.api_key = key.into();
    }

    /// Selected model identifier; empty when none is selected.
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
    }

    /// Whether requests use the chat-style request shape.
    pub fn chat_mode(&self) -> bool {
        self.chat_mode
    }

    pub fn set_chat_mode(&mut self, chat_mode: bool) {
        self.chat_mode = chat_mode;
    }

    /// Proxy base URL, when requests are relayed through an intermediary that
    /// injects its own credentials from the sidecar headers.
    pub fn proxy_endpoint(&self) -> Option<&str> {
        self.proxy_endpoint.as_deref()
    }

    pub fn set_proxy_endpoint(&mut self, proxy: Option<String>) {
        self.proxy_endpoint = proxy.filter(|p| !p.is_empty());
    }
}
