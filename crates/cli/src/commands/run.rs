//! `oli <task>`: run one task against the current directory.

use std::sync::Arc;

use oli_agent::{Assistant, RunSummary};
use oli_config::AppConfig;
use oli_core::Provider;
use oli_providers::OllamaProvider;
use tokio_util::sync::CancellationToken;

use crate::terminal::{InterruptGuard, TerminalPrompter};

/// The assistant for this session, talking to the configured Ollama server.
pub fn assistant(config: &AppConfig) -> Assistant {
    let provider = Arc::new(OllamaProvider::new(&config.ollama_url));
    Assistant::from_config(config, provider)
}

/// Warn early when the Ollama server cannot be reached.
pub async fn check_backend(config: &AppConfig) {
    let provider = OllamaProvider::new(&config.ollama_url);
    match provider.health_check().await {
        Ok(true) => {}
        Ok(false) | Err(_) => eprintln!(
            " Warning: no Ollama server at {}. Start it with `ollama serve`.",
            config.ollama_url
        ),
    }
}

pub async fn run(
    assistant: &Assistant,
    task: &str,
    prompter: &mut TerminalPrompter,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = std::env::current_dir()?;
    let cancel = CancellationToken::new();
    let _guard = InterruptGuard::cancel_on_interrupt(cancel.clone());

    eprintln!(" Gathering context...");
    let result = assistant
        .run(task, &root, &cancel, prompter, &mut std::io::stdout())
        .await;
    report(result)
}

/// Print what happened to each artifact. Cancellation is not an error.
pub fn report(
    result: Result<RunSummary, oli_core::Error>,
) -> Result<(), Box<dyn std::error::Error>> {
    match result {
        Ok(summary) => {
            for outcome in &summary.outcomes {
                eprintln!(" {outcome}");
            }
            Ok(())
        }
        Err(e) if e.is_cancelled() => {
            eprintln!("\n Cancelled.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
