//! Core types and shared state for Quillpad.
//!
//! # Architecture
//!
//! - [`types`] — provider identifiers, model descriptors, request payloads
//! - [`error::ProviderError`] — failure taxonomy for all backend requests
//! - [`settings::SessionSettings`] — the explicit context object holding the
//!   shared connection state (endpoint, provider, key, model, proxy)
//! - [`config`] — on-disk configuration for the CLI binary

pub mod config;
pub mod error;
pub mod settings;
pub mod types;

// Re-export main types for convenience
pub use error::ProviderError;
pub use settings::SessionSettings;
pub use types::{
    ChatMessage, ChatRequest, CompletionRequest, GenerationParams, ModelDescriptor, ModelList,
    ModelPricing, Provider, Role,
};
