//! Terminal I/O: the single stdin reader and Ctrl-C handling.
//!
//! Everything that reads stdin goes through [`TerminalPrompter`], so REPL
//! input and yes/no questions never compete for lines.

use std::io::Write;

use async_trait::async_trait;
use oli_core::Prompter;
use oli_core::prompter::is_affirmative;
use tokio::io::{self, AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Line-oriented stdin reader that also answers confirmations.
pub struct TerminalPrompter {
    lines: Lines<BufReader<Stdin>>,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(io::stdin()).lines(),
        }
    }

    /// The next line of input, or `None` at end of input.
    pub async fn read_line(&mut self) -> Option<String> {
        match self.lines.next_line().await {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stdin");
                None
            }
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Prompter for TerminalPrompter {
    async fn confirm(&mut self, question: &str) -> bool {
        print!("\n {question} (y/n): ");
        let _ = std::io::stdout().flush();
        self.read_line().await.is_some_and(|answer| is_affirmative(&answer))
    }
}

/// Cancels a token when Ctrl-C arrives, for as long as the guard lives.
pub struct InterruptGuard {
    task: JoinHandle<()>,
}

impl InterruptGuard {
    pub fn cancel_on_interrupt(token: CancellationToken) -> Self {
        let task = tokio::spawn(async move {
            tokio::select! {
                signal = tokio::signal::ctrl_c() => {
                    if signal.is_ok() {
                        token.cancel();
                    }
                }
                _ = token.cancelled() => {}
            }
        });
        Self { task }
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        self.task.abort();
    }
}
