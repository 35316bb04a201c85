//! GitHub access through the `gh` CLI.
//!
//! Authentication is whatever `gh auth` already holds; nothing here touches
//! tokens. Every call is a one-shot subprocess and every failure surfaces as
//! a [`ToolError`].

use std::path::Path;
use std::process::Stdio;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use oli_core::error::ToolError;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, warn};

/// Files listed in a repository overview before the rest are summarized.
pub const MAX_LISTED_FILES: usize = 30;

const VIEW_FIELDS: &str = "name,description,primaryLanguage,stargazerCount,forkCount,url,issues";

/// Overview of a remote repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoInfo {
    pub name: String,
    pub description: String,
    pub language: String,
    pub stars: u64,
    pub forks: u64,
    pub open_issues: u64,
    pub url: String,
    /// Top-level paths, capped at [`MAX_LISTED_FILES`] plus a summary line.
    pub files: Vec<String>,
    pub readme: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RepoView {
    name: String,
    description: Option<String>,
    primary_language: Option<Language>,
    stargazer_count: u64,
    fork_count: u64,
    url: String,
    issues: Option<Count>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Language {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Count {
    total_count: u64,
}

/// Runs `gh` subcommands.
#[derive(Debug, Clone)]
pub struct GitHubCli {
    program: String,
}

impl Default for GitHubCli {
    fn default() -> Self {
        Self::new()
    }
}

impl GitHubCli {
    pub fn new() -> Self {
        Self::with_program("gh")
    }

    /// Use a different executable (a wrapper script, or a stub in tests).
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<String, ToolError> {
        debug!(program = %self.program, args = ?args, "Running gh");
        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "gh".into(),
                reason: format!("could not start {}: {e}", self.program),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ToolError::ExecutionFailed {
                tool_name: "gh".into(),
                reason: format!("gh {} failed: {stderr}", args.join(" ")),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Metadata, file list and README of `repo` (`owner/name`).
    ///
    /// Only the metadata call is required; a missing file list or README
    /// leaves that field empty.
    pub async fn repo_info(&self, repo: &str) -> Result<RepoInfo, ToolError> {
        let json = self.run(&["repo", "view", repo, "--json", VIEW_FIELDS]).await?;
        let mut info = parse_repo_view(&json)?;

        let tree = format!("repos/{repo}/git/trees/HEAD");
        match self.run(&["api", &tree, "--jq", ".tree[].path"]).await {
            Ok(listing) => info.files = cap_file_list(&listing),
            Err(e) => warn!(repo, error = %e, "Could not list repository files"),
        }

        match self.run(&["repo", "view", repo]).await {
            Ok(readme) => info.readme = readme,
            Err(e) => warn!(repo, error = %e, "Could not fetch README"),
        }

        Ok(info)
    }

    /// The operator's repositories, as printed by `gh repo list`.
    pub async fn list_repos(&self, limit: usize) -> Result<String, ToolError> {
        let limit = limit.to_string();
        self.run(&["repo", "list", "--limit", &limit]).await
    }

    pub async fn repo_prs(&self, repo: &str) -> Result<String, ToolError> {
        self.run(&["pr", "list", "--repo", repo]).await
    }

    pub async fn repo_issues(&self, repo: &str) -> Result<String, ToolError> {
        self.run(&["issue", "list", "--repo", repo]).await
    }

    /// Clone `repo`, into `dir` when given.
    pub async fn clone_repo(&self, repo: &str, dir: Option<&Path>) -> Result<(), ToolError> {
        let dir = dir.map(|d| d.to_string_lossy().into_owned());
        let mut args = vec!["repo", "clone", repo];
        if let Some(dir) = dir.as_deref() {
            args.push(dir);
        }
        self.run(&args).await.map(|_| ())
    }

    /// Contents of one file in `repo`, decoded from the API's base64.
    pub async fn repo_file(&self, repo: &str, path: &str) -> Result<String, ToolError> {
        let endpoint = format!("repos/{repo}/contents/{path}");
        let encoded = self.run(&["api", &endpoint, "--jq", ".content"]).await?;
        decode_content(&encoded)
    }
}

fn parse_repo_view(json: &str) -> Result<RepoInfo, ToolError> {
    let view: RepoView = serde_json::from_str(json)
        .map_err(|e| ToolError::ExecutionFailed {
            tool_name: "gh".into(),
            reason: format!("unexpected repo view output: {e}"),
        })?;

    Ok(RepoInfo {
        name: view.name,
        description: view.description.unwrap_or_default(),
        language: view.primary_language.map(|l| l.name).unwrap_or_default(),
        stars: view.stargazer_count,
        forks: view.fork_count,
        open_issues: view.issues.map(|c| c.total_count).unwrap_or_default(),
        url: view.url,
        ..RepoInfo::default()
    })
}

fn cap_file_list(listing: &str) -> Vec<String> {
    let mut files: Vec<String> = listing
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect();
    if files.len() > MAX_LISTED_FILES {
        let more = files.len() - MAX_LISTED_FILES;
        files.truncate(MAX_LISTED_FILES);
        files.push(format!("... and {more} more files"));
    }
    files
}

/// The contents API wraps base64 at 60 columns.
fn decode_content(encoded: &str) -> Result<String, ToolError> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| ToolError::ExecutionFailed {
            tool_name: "gh".into(),
            reason: format!("file content is not valid base64: {e}"),
        })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Render a [`RepoInfo`] as a context section.
pub fn format_repo_info(info: &RepoInfo) -> String {
    let mut out = String::new();
    out.push_str(&format!("Repository: {}\n", info.name));
    out.push_str(&format!("URL: {}\n", info.url));
    if !info.description.is_empty() {
        out.push_str(&format!("Description: {}\n", info.description));
    }
    if !info.language.is_empty() {
        out.push_str(&format!("Language: {}\n", info.language));
    }
    out.push_str(&format!(
        "Stars: {} | Forks: {} | Issues: {}\n",
        info.stars, info.forks, info.open_issues
    ));
    if !info.files.is_empty() {
        out.push_str(&format!("\nFiles:\n{}\n", info.files.join("\n")));
    }
    out
}
