//! Context sources: the abstraction over anything that contributes labeled
//! text to a prompt.
//!
//! Implementations: the budgeted filesystem walker, the git snapshot reader,
//! files mentioned in the task, and repository metadata fetched from GitHub.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::ContextError;

/// The labeled output of one context source for one aggregation pass.
///
/// Either `content` is meaningful, or `error` is set and `content` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextUnit {
    /// Name of the source that produced this unit (e.g. "filesystem", "git").
    pub source_name: String,

    /// The context text to inject into the prompt.
    pub content: String,

    /// Set if the source failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ContextUnit {
    /// A successful unit.
    pub fn content(source_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            content: content.into(),
            error: None,
        }
    }

    /// A unit standing in for a failed source. Any partial content is dropped.
    pub fn failed(source_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            content: String::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Neither content nor an error: the assembler leaves it out entirely.
    pub fn is_empty(&self) -> bool {
        self.error.is_none() && self.content.is_empty()
    }
}

/// Numeric limits bounding one filesystem traversal.
///
/// `max_file_bytes <= max_total_bytes` is assumed but not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkBudget {
    /// Maximum number of classified entries (included, listed or skipped).
    pub max_files: usize,
    /// Maximum number of path separators in a root-relative file path.
    pub max_depth: usize,
    /// Files larger than this are listed as oversized and never read.
    pub max_file_bytes: u64,
    /// Cap on the summed size of all included files.
    pub max_total_bytes: u64,
}

impl Default for WalkBudget {
    fn default() -> Self {
        Self {
            max_files: 30,
            max_depth: 4,
            max_file_bytes: 50_000,
            max_total_bytes: 200_000,
        }
    }
}

/// The core ContextSource trait.
///
/// Sources are registered explicitly with the aggregator; any type that can
/// name itself and gather a unit for a working root qualifies.
#[async_trait]
pub trait ContextSource: Send + Sync {
    /// A human-readable identifier used as the section label.
    fn name(&self) -> &str;

    /// Collect context for the given working root.
    ///
    /// Implementations must return `ContextError::Cancelled` promptly once
    /// `cancel` fires.
    async fn gather(
        &self,
        root: &Path,
        cancel: &CancellationToken,
    ) -> std::result::Result<ContextUnit, ContextError>;
}
