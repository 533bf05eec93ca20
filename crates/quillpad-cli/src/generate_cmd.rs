//! `quillpad generate` — stream a generation to stdout.
//!
//! Ctrl-C fires the stream's cancellation token, which closes the backend
//! connection (or withdraws the queued pool request) instead of just
//! discarding output.

use std::io::Write;

use anyhow::{Context, Result};
use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use quillpad_core::config::Config;
use quillpad_core::{ChatMessage, ChatRequest, CompletionRequest};
use quillpad_providers::dispatch;

use crate::helpers::print_no_output;

pub async fn run(config: &Config, prompt: String, chat: bool, max_tokens: Option<u32>) -> Result<()> {
    let settings = config.connection.to_settings();
    let mut params = config.generation.to_params();
    if let Some(limit) = max_tokens {
        params.max_tokens = limit;
    }

    let client = reqwest::Client::builder()
        .connect_timeout(std::time::Duration::from_secs(10))
        .build()
        .context("failed to build HTTP client")?;

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupt received, cancelling generation");
            interrupt.cancel();
        }
    });

    let mut stream = if chat || settings.chat_mode() {
        let request = ChatRequest {
            messages: vec![ChatMessage::user(prompt)],
            params,
        };
        dispatch::chat_completion(&client, &settings, &request, cancel)
            .await
            .context("chat completion failed to start")?
    } else {
        let request = CompletionRequest { prompt, params };
        dispatch::completion(&client, &settings, &request, cancel)
            .await
            .context("completion failed to start")?
    };

    let mut produced = false;
    while let Some(fragment) = stream.next().await {
        match fragment {
            Ok(text) => {
                produced = true;
                print!("{text}");
                let _ = std::io::stdout().flush();
            }
            Err(e) if e.is_cancelled() => break,
            Err(e) => {
                println!();
                return Err(e).context("generation failed");
            }
        }
    }
    if produced {
        println!();
    } else {
        print_no_output();
    }
    Ok(())
}
