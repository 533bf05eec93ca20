//! Configuration for the Quillpad CLI.
//!
//! - [`schema`] — typed config structs (camelCase JSON on disk)
//! - [`loader`] — file + environment loading, saving

pub mod loader;
pub mod schema;

pub use loader::{get_config_path, load_config, save_config};
pub use schema::{Config, ConnectionConfig, GenerationConfig};
