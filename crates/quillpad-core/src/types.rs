//! Core types for Quillpad — provider identifiers, catalog descriptors, and
//! generation request payloads.
//!
//! Catalog entries follow the OpenAI-compatible `/v1/models` wire format.
//! Pricing is special-cased: the aggregation gateway serves per-token prices
//! as decimal *strings*, other servers use numbers, so both deserialize.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

// ─────────────────────────────────────────────
// Provider identifier
// ─────────────────────────────────────────────

/// One of the fixed set of supported backends.
///
/// Immutable once chosen by the user; switching it in the settings panel
/// resets the dependent fields (see `quillpad-ui`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    /// llama.cpp server (local inference).
    #[serde(rename = "llama-cpp")]
    LlamaCpp,
    /// KoboldCpp server (local inference, alternate API).
    #[serde(rename = "kobold-cpp")]
    KoboldCpp,
    /// Any OpenAI-compatible HTTP API.
    #[serde(rename = "openai-compat")]
    OpenAiCompat,
    /// AI Horde community inference pool.
    #[serde(rename = "ai-horde")]
    AiHorde,
    /// OpenRouter model-aggregation gateway.
    #[serde(rename = "openrouter")]
    OpenRouter,
}

impl Provider {
    /// All providers, in the order they appear in the settings panel.
    pub const ALL: [Provider; 5] = [
        Provider::LlamaCpp,
        Provider::KoboldCpp,
        Provider::OpenAiCompat,
        Provider::AiHorde,
        Provider::OpenRouter,
    ];

    /// Stable identifier used in config files and on the CLI.
    pub fn id(self) -> &'static str {
        match self {
            Provider::LlamaCpp => "llama-cpp",
            Provider::KoboldCpp => "kobold-cpp",
            Provider::OpenAiCompat => "openai-compat",
            Provider::AiHorde => "ai-horde",
            Provider::OpenRouter => "openrouter",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Provider::ALL
            .into_iter()
            .find(|p| p.id() == s)
            .ok_or_else(|| format!("unknown provider '{s}'"))
    }
}

// ─────────────────────────────────────────────
// Model catalog descriptors
// ─────────────────────────────────────────────

/// One entry from a provider's model catalog.
///
/// Read-only, refetched on demand, never persisted.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ModelDescriptor {
    /// Model identifier (e.g. `"meta-llama/llama-3.3-70b-instruct"`).
    pub id: String,
    /// Human-readable display name, when the server provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Context window size in tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_length: Option<u64>,
    /// Per-token pricing, when the server provides it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<ModelPricing>,
}

impl ModelDescriptor {
    /// Display name, falling back to the identifier.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// Per-token prompt price, if known.
    pub fn prompt_price(&self) -> Option<f64> {
        self.pricing.as_ref().and_then(|p| p.prompt)
    }

    /// Per-token completion price, if known.
    pub fn completion_price(&self) -> Option<f64> {
        self.pricing.as_ref().and_then(|p| p.completion)
    }
}

/// Per-token prompt/completion pricing.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ModelPricing {
    #[serde(default, deserialize_with = "flexible_price")]
    pub prompt: Option<f64>,
    #[serde(default, deserialize_with = "flexible_price")]
    pub completion: Option<f64>,
}

/// Accepts a JSON number, a decimal string, or null.
fn flexible_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Num(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) => {
            let s = s.trim();
            if s.is_empty() {
                Ok(None)
            } else {
                s.parse::<f64>().map(Some).map_err(serde::de::Error::custom)
            }
        }
    }
}

/// Catalog response body: `{ "data": [ ... ] }`.
///
/// `data` defaults to an empty list when the field is absent.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ModelList {
    #[serde(default)]
    pub data: Vec<ModelDescriptor>,
}

// ─────────────────────────────────────────────
// Generation requests
// ─────────────────────────────────────────────

/// Role of a chat message.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A chat message in the OpenAI wire format.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        ChatMessage {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Sampling parameters shared by all completion handlers.
///
/// Each backend maps these onto its own field names (`n_predict`,
/// `max_length`, `max_tokens`).
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationParams {
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: Option<f64>,
    /// Nucleus sampling cutoff.
    pub top_p: Option<f64>,
    /// Stop sequences.
    pub stop: Vec<String>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: 256,
            temperature: None,
            top_p: None,
            stop: Vec::new(),
        }
    }
}

/// A raw (non-chat) completion request.
#[derive(Clone, Debug, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub params: GenerationParams,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        CompletionRequest {
            prompt: prompt.into(),
            params: GenerationParams::default(),
        }
    }
}

/// A chat completion request.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub params: GenerationParams,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        ChatRequest {
            messages,
            params: GenerationParams::default(),
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
