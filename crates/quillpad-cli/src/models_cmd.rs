//! `quillpad models` — list the configured provider's model catalog.
//!
//! Drives the same picker state machine the settings dialog uses, so sorting
//! and filtering behave identically to the UI.

use anyhow::{bail, Context, Result};
use colored::Colorize;

use quillpad_core::config::Config;
use quillpad_providers::dispatch;
use quillpad_ui::{ModelPicker, SortKey};

use crate::helpers::{format_context, format_price};

pub async fn run(config: &Config, search: Option<String>, sort: SortKey) -> Result<()> {
    let settings = config.connection.to_settings();
    let client = reqwest::Client::builder()
        .connect_timeout(std::time::Duration::from_secs(10))
        .build()
        .context("failed to build HTTP client")?;

    let mut picker = ModelPicker::new();
    let fetch = picker.open(settings.model());
    picker.set_sort(sort);
    if let Some(term) = search {
        picker.set_search(term);
    }

    let result = dispatch::list_models(&client, &settings, &fetch.cancel).await;
    picker.resolve(&fetch, result);

    if let Some(message) = picker.error() {
        bail!("model listing failed: {message}");
    }

    let visible = picker.visible_models();
    if visible.is_empty() {
        println!("{}", "No models found.".dimmed());
        return Ok(());
    }

    for model in visible {
        let marker = if model.id == settings.model() {
            "*".green().bold().to_string()
        } else {
            " ".to_string()
        };
        println!(
            "{} {:<48} {:>8}  in {:>10}  out {:>10}",
            marker,
            model.display_name().bold(),
            format_context(model.context_length),
            format_price(model.prompt_price()),
            format_price(model.completion_price()),
        );
        if model.name.is_some() {
            println!("  {}", model.id.dimmed());
        }
    }
    Ok(())
}
