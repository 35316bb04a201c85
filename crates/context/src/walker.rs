//! Budgeted tree walker: the `filesystem` context source.
//!
//! Walks the working root depth-first in file-name order and classifies each
//! file as included (content read), listed only, or skipped as oversized,
//! under the limits of a [`WalkBudget`].
//!
//! Filters, in order, for every entry:
//! 1. Directories: hidden or noise directories are pruned with their subtree.
//! 2. Files: hidden files and lock/OS metadata files are skipped silently.
//! 3. Files deeper than `max_depth` are skipped.
//! 4. Reaching `max_files` classified entries stops the whole walk.
//! 5. Files outside the text allow-list are listed by name only.
//! 6. Text files are read unless they exceed the per-file or total budget.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use oli_core::error::ContextError;
use oli_core::{ContextSource, ContextUnit, WalkBudget};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};
use walkdir::WalkDir;

const IGNORED_DIRS: &[&str] = &[
    "node_modules",
    "vendor",
    "__pycache__",
    "dist",
    "build",
    ".git",
    "bin",
    "obj",
    "target",
    ".idea",
    ".vscode",
    "coverage",
    ".next",
    ".nuxt",
    "venv",
    ".venv",
    "env",
    ".env",
    "__snapshots__",
    ".cache",
    ".parcel-cache",
    ".turbo",
    "tmp",
    "temp",
    "logs",
    ".pytest_cache",
    ".mypy_cache",
    ".tox",
    "htmlcov",
    ".coverage",
    "eggs",
    ".eggs",
    "wheels",
    "pip-wheel-metadata",
    ".installed.cfg",
    "lib",
    "lib64",
    "parts",
    "sdist",
    "var",
    ".sass-cache",
    "bower_components",
    "jspm_packages",
    ".npm",
    ".yarn",
    ".pnp",
];

const IGNORED_DIR_SUFFIXES: &[&str] = &[".egg-info"];

const IGNORED_FILES: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "Gemfile.lock",
    "Cargo.lock",
    "poetry.lock",
    "composer.lock",
    "go.sum",
    ".DS_Store",
    "Thumbs.db",
];

const TEXT_EXTENSIONS: &[&str] = &[
    "go", "js", "ts", "jsx", "tsx", "py", "java", "c", "cpp", "h", "hpp", "rs", "rb", "php",
    "swift", "kt", "scala", "cs", "html", "css", "scss", "json", "yaml", "yml", "toml", "xml",
    "md", "txt", "sh", "bash", "zsh", "sql", "graphql", "proto",
];

const TEXT_FILENAMES: &[&str] = &["Makefile", "Dockerfile", "Gemfile", "Rakefile"];

/// Immutable ignore-lists and the readable-type allow-list.
#[derive(Debug, Clone)]
pub struct WalkRules {
    ignored_dirs: HashSet<String>,
    ignored_dir_suffixes: Vec<String>,
    ignored_files: HashSet<String>,
    text_extensions: HashSet<String>,
    text_filenames: HashSet<String>,
}

impl Default for WalkRules {
    fn default() -> Self {
        let set = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            ignored_dirs: set(IGNORED_DIRS),
            ignored_dir_suffixes: IGNORED_DIR_SUFFIXES.iter().map(|s| s.to_string()).collect(),
            ignored_files: set(IGNORED_FILES),
            text_extensions: set(TEXT_EXTENSIONS),
            text_filenames: set(TEXT_FILENAMES),
        }
    }
}

impl WalkRules {
    /// Whether a directory (and everything below it) is skipped.
    pub fn prunes_dir(&self, name: &str) -> bool {
        name.starts_with('.')
            || self.ignored_dirs.contains(name)
            || self.ignored_dir_suffixes.iter().any(|s| name.ends_with(s.as_str()))
    }

    /// Whether a file is skipped without being counted or listed.
    pub fn ignores_file(&self, name: &str) -> bool {
        name.starts_with('.') || self.ignored_files.contains(name)
    }

    /// Whether a file's content may be read into the context.
    pub fn is_text(&self, name: &str) -> bool {
        if self.text_filenames.contains(name) {
            return true;
        }
        Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.text_extensions.contains(ext))
    }
}

/// Why a file appears in the manifest without its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListedReason {
    NotTextType,
    BudgetExceeded,
    Unreadable,
}

impl std::fmt::Display for ListedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotTextType => write!(f, "not a recognized text type"),
            Self::BudgetExceeded => write!(f, "omitted: context budget exceeded"),
            Self::Unreadable => write!(f, "read error"),
        }
    }
}

/// One classified file. Paths are root-relative with `/` separators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkEntry {
    ContentIncluded { path: String, text: String, size: u64 },
    ListedOnly { path: String, reason: ListedReason },
    SkippedOversized { path: String, size: u64 },
}

impl WalkEntry {
    pub fn path(&self) -> &str {
        match self {
            Self::ContentIncluded { path, .. }
            | Self::ListedOnly { path, .. }
            | Self::SkippedOversized { path, .. } => path,
        }
    }

    fn manifest_line(&self) -> Option<String> {
        match self {
            Self::ContentIncluded { .. } => None,
            Self::ListedOnly {
                path,
                reason: ListedReason::NotTextType,
            } => Some(path.clone()),
            Self::ListedOnly { path, reason } => Some(format!("{path} ({reason})")),
            Self::SkippedOversized { path, size } => {
                Some(format!("{path} (too large: {}KB)", size / 1024))
            }
        }
    }
}

/// The classified entries of one walk, in traversal order.
#[derive(Debug, Clone, Default)]
pub struct WalkReport {
    pub entries: Vec<WalkEntry>,
}

impl WalkReport {
    /// Sum of the sizes of all included files.
    pub fn included_bytes(&self) -> u64 {
        self.entries
            .iter()
            .map(|e| match e {
                WalkEntry::ContentIncluded { size, .. } => *size,
                _ => 0,
            })
            .sum()
    }

    /// Content sections first, then the manifest of everything else. Each
    /// group keeps traversal order.
    pub fn render(&self) -> String {
        let sections: Vec<String> = self
            .entries
            .iter()
            .filter_map(|e| match e {
                WalkEntry::ContentIncluded { path, text, .. } => {
                    Some(format!("### {path}\n```\n{text}\n```"))
                }
                _ => None,
            })
            .collect();

        let manifest: Vec<String> = self.entries.iter().filter_map(WalkEntry::manifest_line).collect();

        let mut out = String::new();
        if !sections.is_empty() {
            out.push_str("## Project file contents\n\n");
            out.push_str(&sections.join("\n\n"));
        }
        if !manifest.is_empty() {
            if !out.is_empty() {
                out.push_str("\n\n");
            }
            out.push_str("## Other files (no content)\n");
            out.push_str(&manifest.join("\n"));
        }
        out
    }
}

/// Walks a working root under a [`WalkBudget`].
///
/// Cheap to clone; the rules are shared.
#[derive(Debug, Clone)]
pub struct TreeWalker {
    budget: WalkBudget,
    rules: Arc<WalkRules>,
}

impl TreeWalker {
    pub fn new(budget: WalkBudget) -> Self {
        Self::with_rules(budget, WalkRules::default())
    }

    pub fn with_rules(budget: WalkBudget, rules: WalkRules) -> Self {
        Self {
            budget,
            rules: Arc::new(rules),
        }
    }

    pub fn budget(&self) -> WalkBudget {
        self.budget
    }

    /// Walk `root` synchronously.
    ///
    /// Fails with `ContextError::Io` if the root itself is inaccessible and
    /// with `ContextError::Cancelled` if `cancel` fires; errors below the root
    /// only skip the affected entry.
    pub fn walk(&self, root: &Path, cancel: &CancellationToken) -> Result<WalkReport, ContextError> {
        self.walk_observed(root, cancel, |_| {})
    }

    /// `walk`, calling `on_entry` with the number of entries visited so far.
    fn walk_observed(
        &self,
        root: &Path,
        cancel: &CancellationToken,
        mut on_entry: impl FnMut(usize),
    ) -> Result<WalkReport, ContextError> {
        let io_error = |reason: String| ContextError::Io {
            path: root.display().to_string(),
            reason,
        };
        let meta = std::fs::metadata(root).map_err(|e| io_error(e.to_string()))?;
        if !meta.is_dir() {
            return Err(io_error("not a directory".into()));
        }
        std::fs::read_dir(root).map_err(|e| io_error(e.to_string()))?;

        let budget = self.budget;
        let mut report = WalkReport::default();
        let mut total_bytes: u64 = 0;
        let mut visited = 0usize;

        // Files at walkdir depth d sit at relative depth d - 1, so nothing
        // below max_depth + 1 can ever be classified.
        let mut entries = WalkDir::new(root)
            .sort_by_file_name()
            .max_depth(budget.max_depth.saturating_add(1))
            .into_iter();

        loop {
            if cancel.is_cancelled() {
                debug!(visited, "Walk cancelled");
                return Err(ContextError::Cancelled);
            }

            let entry = match entries.next() {
                None => break,
                Some(Ok(entry)) => entry,
                Some(Err(e)) => {
                    trace!(error = %e, "Skipping unreadable entry");
                    continue;
                }
            };
            visited += 1;
            on_entry(visited);

            if entry.depth() == 0 {
                continue;
            }

            let name = entry.file_name().to_string_lossy();

            if entry.file_type().is_dir() {
                if self.rules.prunes_dir(&name) {
                    trace!(dir = %name, "Pruning directory");
                    entries.skip_current_dir();
                }
                continue;
            }

            if self.rules.ignores_file(&name) {
                continue;
            }

            let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
            let depth = rel.components().count().saturating_sub(1);
            if depth > budget.max_depth {
                continue;
            }

            if report.entries.len() >= budget.max_files {
                debug!(max_files = budget.max_files, "File limit reached, stopping walk");
                break;
            }

            let path = display_path(rel);

            if !self.rules.is_text(&name) {
                report.entries.push(WalkEntry::ListedOnly {
                    path,
                    reason: ListedReason::NotTextType,
                });
                continue;
            }

            let Ok(meta) = std::fs::metadata(entry.path()) else {
                continue;
            };
            // FIFOs, sockets and devices can block or never end.
            if !meta.is_file() {
                trace!(path = %path, "Skipping non-regular file");
                continue;
            }

            let entry = self.classify_text(entry.path(), path, meta.len(), total_bytes);
            if let WalkEntry::ContentIncluded { size, .. } = &entry {
                total_bytes += size;
            }
            report.entries.push(entry);
        }

        debug!(
            classified = report.entries.len(),
            included_bytes = total_bytes,
            "Walk complete"
        );
        Ok(report)
    }

    fn classify_text(&self, full: &Path, path: String, size: u64, total_bytes: u64) -> WalkEntry {
        let budget = self.budget;
        if size > budget.max_file_bytes {
            return WalkEntry::SkippedOversized { path, size };
        }
        if total_bytes + size > budget.max_total_bytes {
            return WalkEntry::ListedOnly {
                path,
                reason: ListedReason::BudgetExceeded,
            };
        }

        let bytes = match read_capped(full, budget.max_file_bytes) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(path = %path, error = %e, "Failed to read file");
                return WalkEntry::ListedOnly {
                    path,
                    reason: ListedReason::Unreadable,
                };
            }
        };

        // The file may have grown since it was stat'ed.
        let read = bytes.len() as u64;
        if read > budget.max_file_bytes {
            return WalkEntry::SkippedOversized {
                path,
                size: read.max(size),
            };
        }
        let size = read;
        if total_bytes + size > budget.max_total_bytes {
            return WalkEntry::ListedOnly {
                path,
                reason: ListedReason::BudgetExceeded,
            };
        }

        WalkEntry::ContentIncluded {
            path,
            text: String::from_utf8_lossy(&bytes).into_owned(),
            size,
        }
    }
}

/// Read at most `limit + 1` bytes, enough to tell that a file went over.
fn read_capped(path: &Path, limit: u64) -> std::io::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    File::open(path)?
        .take(limit.saturating_add(1))
        .read_to_end(&mut bytes)?;
    Ok(bytes)
}

fn display_path(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[async_trait]
impl ContextSource for TreeWalker {
    fn name(&self) -> &str {
        "filesystem"
    }

    async fn gather(
        &self,
        root: &Path,
        cancel: &CancellationToken,
    ) -> Result<ContextUnit, ContextError> {
        let walker = self.clone();
        let root = root.to_path_buf();
        let cancel = cancel.clone();

        let report = tokio::task::spawn_blocking(move || walker.walk(&root, &cancel))
            .await
            .map_err(|e| ContextError::Source(format!("walker task failed: {e}")))??;

        Ok(ContextUnit::content(self.name(), report.render()))
    }
}
