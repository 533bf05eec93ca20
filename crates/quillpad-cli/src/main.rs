//! Quillpad CLI — entry point.
//!
//! # Commands
//!
//! - `quillpad models [--search TERM] [--sort KEY]` — list the provider's model catalog
//! - `quillpad generate PROMPT [--chat]` — stream a generation to stdout
//! - `quillpad init` — write a default config file

mod generate_cmd;
mod helpers;
mod models_cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

use quillpad_core::config::{get_config_path, load_config, save_config, Config};
use quillpad_ui::SortKey;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Quillpad — text-generation backend client
#[derive(Parser)]
#[command(name = "quillpad", version, about, long_about = None)]
struct Cli {
    /// Config file path (defaults to ~/.quillpad/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true, default_value_t = false)]
    logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the models the configured provider serves
    Models {
        /// Case-insensitive substring filter over id and display name
        #[arg(long)]
        search: Option<String>,

        /// Sort order: name, context, or price
        #[arg(long, default_value = "name")]
        sort: SortKey,
    },

    /// Stream a generation to stdout (Ctrl-C cancels)
    Generate {
        /// The prompt (raw mode) or user message (chat mode)
        prompt: String,

        /// Use the chat-style request shape
        #[arg(long, default_value_t = false)]
        chat: bool,

        /// Override the configured token limit
        #[arg(long)]
        max_tokens: Option<u32>,
    },

    /// Write a default config file
    Init,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.logs);

    let config_path = cli.config.as_deref().map(helpers::expand_tilde);
    let config = load_config(config_path.as_deref());

    match cli.command {
        Commands::Models { search, sort } => models_cmd::run(&config, search, sort).await,
        Commands::Generate {
            prompt,
            chat,
            max_tokens,
        } => generate_cmd::run(&config, prompt, chat, max_tokens).await,
        Commands::Init => run_init(&config, config_path),
    }
}

/// Write a default config file, refusing to clobber an existing one.
fn run_init(config: &Config, path: Option<PathBuf>) -> Result<()> {
    let target = path.unwrap_or_else(get_config_path);
    if target.exists() {
        println!(
            "{} config already exists at {}",
            "!".yellow().bold(),
            target.display()
        );
        return Ok(());
    }
    save_config(config, Some(&target))?;
    println!("{} wrote {}", "✓".green().bold(), target.display());
    Ok(())
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("quillpad=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
