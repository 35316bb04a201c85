//! The assistant pipeline: one task in, streamed answer and saved files out.
//!
//! ```text
//! mentioned files ─┐
//! context sources ─┴─► assemble ─► stream from provider ─► extract ─► persist
//! ```

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use oli_config::AppConfig;
use oli_context::{ContextAggregator, GitSnapshot, PromptAssembler, TreeWalker};
use oli_core::error::{ContextError, Error};
use oli_core::{ContextUnit, GenerateRequest, Prompter, Provider};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::extract::ArtifactExtractor;
use crate::mentions::read_mentioned;
use crate::persist::{ArtifactPersister, PersistOutcome};

/// The result of one completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// The full response text.
    pub response: String,
    /// One outcome per extracted artifact, in extraction order.
    pub outcomes: Vec<PersistOutcome>,
}

impl RunSummary {
    pub fn saved(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_saved()).count()
    }
}

/// Wires context gathering, generation and artifact handling together.
pub struct Assistant {
    provider: Arc<dyn Provider>,
    model: String,
    aggregator: ContextAggregator,
    assembler: PromptAssembler,
    extractor: ArtifactExtractor,
}

impl Assistant {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        aggregator: ContextAggregator,
        assembler: PromptAssembler,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            aggregator,
            assembler,
            extractor: ArtifactExtractor::builtin(),
        }
    }

    /// The standard setup: filesystem and git sources, the configured
    /// system prompt and model.
    pub fn from_config(config: &AppConfig, provider: Arc<dyn Provider>) -> Self {
        let aggregator = ContextAggregator::new()
            .with_source(Arc::new(TreeWalker::new(config.walk.budget())))
            .with_source(Arc::new(GitSnapshot::new()));
        let assembler = PromptAssembler::new(config.system_prompt());
        Self::new(provider, config.model.clone(), aggregator, assembler)
    }

    pub fn with_extractor(mut self, extractor: ArtifactExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run `task` against the working directory `root`.
    pub async fn run(
        &self,
        task: &str,
        root: &Path,
        cancel: &CancellationToken,
        prompter: &mut dyn Prompter,
        out: &mut (dyn Write + Send),
    ) -> Result<RunSummary, Error> {
        let mentioned = read_mentioned(task, root, prompter).await;

        let mut units = self.aggregator.gather(root, cancel).await;
        if cancel.is_cancelled() {
            return Err(ContextError::Cancelled.into());
        }
        units.extend(mentioned);

        self.run_with_context(task, units, root, cancel, prompter, out)
            .await
    }

    /// Run `task` with context gathered elsewhere. Artifacts are still
    /// saved under `root`.
    pub async fn run_with_context(
        &self,
        task: &str,
        units: Vec<ContextUnit>,
        root: &Path,
        cancel: &CancellationToken,
        prompter: &mut dyn Prompter,
        out: &mut (dyn Write + Send),
    ) -> Result<RunSummary, Error> {
        let messages = self.assembler.build(&units, task);
        debug!(
            units = units.len(),
            prompt_bytes = messages.user.len(),
            "Prompt assembled"
        );

        let request = GenerateRequest::new(self.model.clone(), messages);
        let response = {
            let mut echo = |fragment: &str| {
                // The terminal going away is not a reason to stop generating.
                let _ = out.write_all(fragment.as_bytes());
                let _ = out.flush();
            };
            self.provider
                .generate_collect(request, cancel, &mut echo)
                .await?
        };
        let _ = writeln!(out);

        let artifacts = self.extractor.extract(&response);
        if !artifacts.is_empty() {
            info!(count = artifacts.len(), "Found files in response");
        }

        let outcomes = ArtifactPersister::new(root)
            .persist_all(&artifacts, prompter)
            .await;

        Ok(RunSummary { response, outcomes })
    }
}
