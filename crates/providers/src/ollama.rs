//! Ollama provider implementation.
//!
//! Speaks the native `/api/generate` protocol: one POST, answered with a
//! newline-delimited stream of JSON records, each carrying a `response`
//! fragment, an optional `error`, and a `done` flag on the last one.

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use oli_core::error::ProviderError;
use oli_core::provider::{FragmentSink, GenerateRequest, Provider};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::ndjson::NdjsonFramer;

/// A provider backed by a local (or remote) Ollama server.
pub struct OllamaProvider {
    base_url: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    /// Create a provider for the server at `base_url` (e.g. `http://localhost:11434`).
    pub fn new(base_url: impl Into<String>) -> Self {
        // Connect timeout only: generation on a large model can take minutes.
        let client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Failed to configure HTTP client, using defaults");
                reqwest::Client::new()
            });

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(
        &self,
        request: GenerateRequest,
        cancel: &CancellationToken,
        on_fragment: &mut FragmentSink<'_>,
    ) -> Result<(), ProviderError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateBody {
            model: &request.model,
            prompt: &request.messages.user,
            system: &request.messages.system,
            stream: true,
        };

        debug!(model = %request.model, url = %url, "Sending generate request");

        let send = self.client.post(&url).json(&body).send();
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
            result = send => result.map_err(|e| ProviderError::Network(e.to_string()))?,
        };

        let status = response.status().as_u16();
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Ollama returned error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        consume_records(response.bytes_stream(), cancel, on_fragment).await
    }

    async fn health_check(&self) -> Result<bool, ProviderError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        Ok(response.status().is_success())
    }
}

// --- Wire types ---

#[derive(Debug, Serialize)]
struct GenerateBody<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    system: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateRecord {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

enum Flow {
    Continue,
    Done,
}

/// Drive a chunked NDJSON body to completion.
///
/// Each fragment reaches `on_fragment` before the next record is looked at.
/// The stream is dropped on every exit path, which closes the connection
/// when it comes from a live response.
async fn consume_records<S, B, E>(
    stream: S,
    cancel: &CancellationToken,
    on_fragment: &mut FragmentSink<'_>,
) -> Result<(), ProviderError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let mut stream = std::pin::pin!(stream);
    let mut framer = NdjsonFramer::new();
    let mut fragments = 0usize;

    loop {
        while let Some(line) = framer.next_line() {
            if cancel.is_cancelled() {
                return Err(ProviderError::Cancelled);
            }
            if let Flow::Done = handle_record(&line, on_fragment, &mut fragments)? {
                debug!(fragments, "Generation complete");
                return Ok(());
            }
        }

        let chunk = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
            chunk = stream.next() => chunk,
        };

        match chunk {
            Some(Ok(bytes)) => {
                if let Err(e) = framer.push(bytes.as_ref()) {
                    warn!(error = %e, fragments, "Dropping runaway record");
                    return Err(ProviderError::StreamInterrupted(e.to_string()));
                }
            }
            Some(Err(e)) => {
                warn!(error = %e, fragments, "Stream interrupted");
                return Err(ProviderError::StreamInterrupted(e.to_string()));
            }
            None => break,
        }
    }

    if let Some(line) = framer.finish() {
        if cancel.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }
        handle_record(&line, on_fragment, &mut fragments)?;
    }

    debug!(fragments, "Stream ended without a done record");
    Ok(())
}

fn handle_record(
    line: &str,
    on_fragment: &mut FragmentSink<'_>,
    fragments: &mut usize,
) -> Result<Flow, ProviderError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Flow::Continue);
    }

    let record: GenerateRecord = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => {
            trace!(error = %e, data = %line, "Skipping unparseable record");
            return Ok(Flow::Continue);
        }
    };

    if let Some(error) = record.error.filter(|e| !e.is_empty()) {
        warn!(error = %error, "Backend reported an error mid-stream");
        return Err(ProviderError::Backend(error));
    }

    if !record.response.is_empty() {
        *fragments += 1;
        on_fragment(&record.response);
    }

    Ok(if record.done { Flow::Done } else { Flow::Continue })
}
