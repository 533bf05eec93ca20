//! Shared CLI helpers — path expansion and display formatting.

use std::path::{Path, PathBuf};

use colored::Colorize;

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Some(text) = path.to_str() else {
        return path.to_path_buf();
    };
    if let Some(rest) = text.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if text == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    path.to_path_buf()
}

/// Format a per-token price as dollars per million tokens.
pub fn format_price(price: Option<f64>) -> String {
    match price {
        None => "N/A".to_string(),
        Some(p) => format!("${:.2}/1M", p * 1_000_000.0),
    }
}

/// Format a context length in thousands of tokens.
pub fn format_context(length: Option<u64>) -> String {
    match length {
        None => "N/A".to_string(),
        Some(n) => format!("{}K", n / 1000),
    }
}

/// Print a "no output" marker for generations that produced nothing.
pub fn print_no_output() {
    println!("{}", "(no output)".dimmed());
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
