//! UI state machines for Quillpad's connection settings.
//!
//! Nothing here renders anything: these types model the *state* of the
//! settings surfaces so any front-end (or the CLI) can drive them.
//!
//! - [`picker::ModelPicker`] — the gateway model-selection dialog
//! - [`panel`] — provider switch side effects and per-provider field rules

pub mod panel;
pub mod picker;

pub use panel::switch_provider;
pub use picker::{CatalogFetch, ModelPicker, PickerPhase, SortKey};
