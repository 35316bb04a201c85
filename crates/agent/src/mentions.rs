//! Files named in the task text, read with the operator's permission.

use std::collections::HashSet;
use std::path::Path;

use oli_core::{ContextUnit, Prompter};
use oli_tools::read_file;
use regex_lite::Regex;
use tracing::{debug, warn};

pub const SOURCE_NAME: &str = "read-files";

const MENTION_PATTERN: &str = r"[\w\-./]+\.(?:go|js|ts|py|java|c|cpp|h|rs|rb|php|html|css|json|yaml|yml|md|txt|sh|sql)\b";

/// Paths that look like source files, deduplicated, in order of first mention.
pub fn mentioned_files(task: &str) -> Vec<String> {
    let regex = match Regex::new(MENTION_PATTERN) {
        Ok(re) => re,
        Err(e) => {
            warn!(error = %e, "Invalid mention pattern");
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    regex
        .find_iter(task)
        .map(|m| m.as_str().to_string())
        .filter(|path| seen.insert(path.clone()))
        .collect()
}

/// Offer each mentioned file to the operator and read the accepted ones.
///
/// Returns `None` when nothing was read.
pub async fn read_mentioned(
    task: &str,
    root: &Path,
    prompter: &mut dyn Prompter,
) -> Option<ContextUnit> {
    let mut blocks = Vec::new();

    for path in mentioned_files(task) {
        if !prompter.confirm(&format!("Read file '{path}'?")).await {
            continue;
        }
        match read_file(&root.join(&path)).await {
            Ok(content) => {
                debug!(path = %path, bytes = content.len(), "Read mentioned file");
                blocks.push(format!("### File: {path}\n```\n{content}\n```"));
            }
            Err(e) => warn!(path = %path, error = %e, "Could not read mentioned file"),
        }
    }

    (!blocks.is_empty()).then(|| ContextUnit::content(SOURCE_NAME, blocks.join("\n\n")))
}
