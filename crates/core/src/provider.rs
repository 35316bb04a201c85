//! Provider trait: the abstraction over generation backends.
//!
//! A Provider knows how to send a message pair to a model and push the
//! response back, fragment by fragment, to an observer callback.
//!
//! Implementations: the Ollama `/api/generate` NDJSON protocol.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::ProviderError;
use crate::message::MessagePair;

/// The observer that receives response fragments as they arrive.
///
/// The bound is spelled out as higher-ranked: every fragment is borrowed only
/// for the duration of its own call.
pub type FragmentSink<'s> = dyn for<'a> FnMut(&'a str) + Send + 's;

/// Configuration for a single generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// The model to use (e.g., "qwen2.5-coder:14b")
    pub model: String,

    /// The assembled system directive and user prompt
    pub messages: MessagePair,
}

impl GenerateRequest {
    pub fn new(model: impl Into<String>, messages: MessagePair) -> Self {
        Self {
            model: model.into(),
            messages,
        }
    }
}

/// The core Provider trait.
///
/// `generate` is a synchronous push loop from the caller's point of view:
/// each fragment is handed to `on_fragment` before the next record is read,
/// so the observer sees fragments strictly in emission order.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "ollama").
    fn name(&self) -> &str;

    /// Send a request and stream the response into `on_fragment`.
    ///
    /// Returns `ProviderError::Cancelled` once `cancel` fires; fragments
    /// delivered before that point are not retracted. No retries.
    async fn generate(
        &self,
        request: GenerateRequest,
        cancel: &CancellationToken,
        on_fragment: &mut FragmentSink<'_>,
    ) -> std::result::Result<(), ProviderError>;

    /// Like [`generate`](Self::generate), but also returns the full text.
    async fn generate_collect(
        &self,
        request: GenerateRequest,
        cancel: &CancellationToken,
        on_fragment: &mut FragmentSink<'_>,
    ) -> std::result::Result<String, ProviderError> {
        let mut full = String::new();
        let mut tee = |fragment: &str| {
            full.push_str(fragment);
            on_fragment(fragment);
        };
        self.generate(request, cancel, &mut tee).await?;
        Ok(full)
    }

    /// Health check: can we reach the backend?
    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        Ok(true)
    }
}
