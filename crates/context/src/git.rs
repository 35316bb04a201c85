//! Git snapshot: the `git` context source.
//!
//! Reports the current branch, the last five commits and the short status
//! of the working tree. A directory outside any repository, or a machine
//! without git, is reported as content rather than an error.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use oli_core::error::ContextError;
use oli_core::{ContextSource, ContextUnit};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub const NOT_A_REPOSITORY: &str = "Not a git repository.";
pub const GIT_UNAVAILABLE: &str = "git is not available.";

/// Reads repository state by invoking the `git` executable.
#[derive(Debug, Clone, Default)]
pub struct GitSnapshot;

impl GitSnapshot {
    pub fn new() -> Self {
        Self
    }

    /// Build the snapshot text for `root`.
    pub async fn snapshot(
        &self,
        root: &Path,
        cancel: &CancellationToken,
    ) -> Result<String, ContextError> {
        match run_git(root, &["rev-parse", "--git-dir"], cancel).await {
            Ok(_) => {}
            Err(GitFailure::Unavailable(reason)) => {
                debug!(reason = %reason, "git could not be started");
                return Ok(GIT_UNAVAILABLE.to_string());
            }
            Err(GitFailure::Failed) => return Ok(NOT_A_REPOSITORY.to_string()),
            Err(GitFailure::Cancelled) => return Err(ContextError::Cancelled),
        }

        let mut sections = Vec::new();

        if let Some(branch) = optional(run_git(root, &["branch", "--show-current"], cancel).await)? {
            sections.push(format!("Branch: {}", branch.trim()));
        }

        if let Some(log) = optional(run_git(root, &["log", "--oneline", "-5"], cancel).await)?
            && !log.trim().is_empty()
        {
            sections.push(format!("Recent commits:\n{}", log.trim()));
        }

        if let Some(status) = optional(run_git(root, &["status", "--short"], cancel).await)? {
            if status.trim().is_empty() {
                sections.push("Working tree clean.".to_string());
            } else {
                sections.push(format!("Changed files:\n{}", status.trim_end()));
            }
        }

        Ok(sections.join("\n\n"))
    }
}

#[async_trait]
impl ContextSource for GitSnapshot {
    fn name(&self) -> &str {
        "git"
    }

    async fn gather(
        &self,
        root: &Path,
        cancel: &CancellationToken,
    ) -> Result<ContextUnit, ContextError> {
        let text = self.snapshot(root, cancel).await?;
        Ok(ContextUnit::content(self.name(), text))
    }
}

#[derive(Debug)]
enum GitFailure {
    /// The executable could not be spawned.
    Unavailable(String),
    /// git ran and exited non-zero.
    Failed,
    Cancelled,
}

/// A section whose command fails is left out; only cancellation propagates.
fn optional(result: Result<String, GitFailure>) -> Result<Option<String>, ContextError> {
    match result {
        Ok(out) => Ok(Some(out)),
        Err(GitFailure::Cancelled) => Err(ContextError::Cancelled),
        Err(_) => Ok(None),
    }
}

async fn run_git(
    root: &Path,
    args: &[&str],
    cancel: &CancellationToken,
) -> Result<String, GitFailure> {
    let child = Command::new("git")
        .args(args)
        .current_dir(root)
        .env("GIT_OPTIONAL_LOCKS", "0")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| GitFailure::Unavailable(e.to_string()))?;

    let output = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(GitFailure::Cancelled),
        out = child.wait_with_output() => out.map_err(|e| GitFailure::Unavailable(e.to_string()))?,
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        debug!(args = ?args, stderr = %stderr, "git exited with failure");
        return Err(GitFailure::Failed);
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
