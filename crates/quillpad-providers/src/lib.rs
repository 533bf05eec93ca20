//! Backend provider layer for Quillpad.
//!
//! # Architecture
//!
//! - [`registry`] — one static spec row per backend: normalizer rule,
//!   capabilities, switch side effects, UI field rules
//! - [`endpoint::normalize_endpoint`] — canonical base URL per provider
//! - [`stream::TokenStream`] — cancellable stream of text fragments
//! - [`catalog`] — OpenAI-wire `/v1/models` fetch (direct or proxied)
//! - [`openai`], [`llama_cpp`], [`kobold_cpp`], [`horde`] — per-backend
//!   request builders
//! - [`dispatch`] — the three public entry points (listing, completion,
//!   chat completion), parameterized by provider + connection settings

pub mod catalog;
pub mod dispatch;
pub mod endpoint;
pub mod headers;
pub mod horde;
pub mod kobold_cpp;
pub mod llama_cpp;
pub mod openai;
pub mod registry;
pub mod stream;

// Re-export main types for convenience
pub use dispatch::{chat_completion, completion, list_models};
pub use endpoint::normalize_endpoint;
pub use registry::{EndpointRewrite, ModelSelector, ProviderSpec, PROVIDERS};
pub use stream::TokenStream;
