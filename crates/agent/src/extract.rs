//! Artifact extraction: find `(filename, content)` pairs in a model response.
//!
//! Models label generated files in a handful of ways. Each convention is a
//! [`FencedFileMatcher`]; the extractor applies them in priority order and
//! keeps the first artifact seen for each filename.

use std::collections::HashSet;

use oli_core::ExtractedArtifact;
use regex_lite::Regex;
use tracing::{debug, warn};

/// A path with at least one extension, e.g. `src/main.rs` or `web/app.min.js`.
const PATH: &str = r"[\w\-./]+\.\w+";

/// Recognizes one labeling convention.
pub trait ArtifactMatcher: Send + Sync {
    fn name(&self) -> &str;

    /// All non-overlapping matches in `response`, in position order.
    fn find_all(&self, response: &str) -> Vec<ExtractedArtifact>;
}

/// A regex whose first capture is the filename and second is the body.
#[derive(Debug, Clone)]
pub struct FencedFileMatcher {
    name: String,
    regex: Regex,
}

impl FencedFileMatcher {
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self, regex_lite::Error> {
        Ok(Self {
            name: name.into(),
            regex: Regex::new(pattern)?,
        })
    }
}

impl ArtifactMatcher for FencedFileMatcher {
    fn name(&self) -> &str {
        &self.name
    }

    fn find_all(&self, response: &str) -> Vec<ExtractedArtifact> {
        self.regex
            .captures_iter(response)
            .filter_map(|caps| {
                let filename = caps.get(1)?.as_str();
                let body = caps.get(2)?.as_str();
                Some(ExtractedArtifact::new(filename, body.trim()))
            })
            .collect()
    }
}

/// The built-in conventions, highest priority first.
fn builtin_patterns() -> [(&'static str, String); 5] {
    [
        // ```go:path/to/file.go
        (
            "lang-colon-path",
            format!(r"```\w*:({PATH})\s*\n([\s\S]*?)```"),
        ),
        // ```go path/to/file.go
        (
            "lang-space-path",
            format!(r"```\w*[ \t]+({PATH})[ \t]*\n([\s\S]*?)```"),
        ),
        // **path/to/file.go**
        (
            "bold-path",
            format!(r"\*\*({PATH})\*\*[:\s]*\n```\w*\n([\s\S]*?)```"),
        ),
        // `path/to/file.go`
        (
            "code-path",
            format!(r"`({PATH})`[:\s]*\n```\w*\n([\s\S]*?)```"),
        ),
        // File: path/to/file.go
        (
            "file-label",
            format!(r"(?i)(?:archivo|file)[:\s]+({PATH})\s*\n```\w*\n([\s\S]*?)```"),
        ),
    ]
}

/// Applies matchers in priority order and deduplicates by filename.
pub struct ArtifactExtractor {
    matchers: Vec<Box<dyn ArtifactMatcher>>,
}

impl Default for ArtifactExtractor {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ArtifactExtractor {
    /// An extractor with no matchers; add them with [`with_matcher`](Self::with_matcher).
    pub fn empty() -> Self {
        Self {
            matchers: Vec::new(),
        }
    }

    /// The five built-in conventions.
    pub fn builtin() -> Self {
        let mut extractor = Self::empty();
        for (name, pattern) in builtin_patterns() {
            match FencedFileMatcher::new(name, &pattern) {
                Ok(matcher) => extractor = extractor.with_matcher(Box::new(matcher)),
                Err(e) => warn!(matcher = name, error = %e, "Invalid artifact pattern"),
            }
        }
        extractor
    }

    /// Append a matcher at the lowest priority.
    pub fn with_matcher(mut self, matcher: Box<dyn ArtifactMatcher>) -> Self {
        self.matchers.push(matcher);
        self
    }

    pub fn matcher_names(&self) -> Vec<&str> {
        self.matchers.iter().map(|m| m.name()).collect()
    }

    /// Every artifact in `response`, at most one per filename.
    ///
    /// Ordered by matcher priority, then by position in the response.
    pub fn extract(&self, response: &str) -> Vec<ExtractedArtifact> {
        let mut seen = HashSet::new();
        let mut artifacts = Vec::new();

        for matcher in &self.matchers {
            for artifact in matcher.find_all(response) {
                if seen.insert(artifact.filename.clone()) {
                    artifacts.push(artifact);
                } else {
                    debug!(
                        matcher = matcher.name(),
                        filename = %artifact.filename,
                        "Discarding duplicate artifact"
                    );
                }
            }
        }

        artifacts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(response: &str) -> Vec<ExtractedArtifact> {
        ArtifactExtractor::builtin().extract(response)
    }

    #[test]
    fn all_builtin_patterns_compile() {
        assert_eq!(
            ArtifactExtractor::builtin().matcher_names(),
            vec!["lang-colon-path", "lang-space-path", "bold-path", "code-path", "file-label"]
        );
    }

    #[test]
    fn lang_colon_path() {
        let artifacts = extract("Here:\n```go:cmd/main.go\npackage main\n\nfunc main() {}\n```\n");
        assert_eq!(
            artifacts,
            vec![ExtractedArtifact::new("cmd/main.go", "package main\n\nfunc main() {}")]
        );
    }

    #[test]
    fn lang_space_path() {
        let artifacts = extract("```rust src/lib.rs\npub fn f() {}\n```");
        assert_eq!(artifacts, vec![ExtractedArtifact::new("src/lib.rs", "pub fn f() {}")]);
    }

    #[test]
    fn bold_and_code_labels() {
        let response = "**app.py**:\n```python\nprint('hi')\n```\n\n`style.css`\n```css\nbody {}\n```";
        let artifacts = extract(response);
        assert_eq!(
            artifacts,
            vec![
                ExtractedArtifact::new("app.py", "print('hi')"),
                ExtractedArtifact::new("style.css", "body {}"),
            ]
        );
    }

    #[test]
    fn file_label_any_case() {
        let response = "FILE: notes.md\n```\n# Notes\n```\nArchivo: util.js\n```js\nexport {}\n```";
        let names: Vec<_> = extract(response).into_iter().map(|a| a.filename).collect();
        assert_eq!(names, vec!["notes.md", "util.js"]);
    }

    #[test]
    fn higher_priority_wins_for_same_file() {
        let response = "```go a.go\nfrom pattern two\n```\n\n```go:a.go\nfrom pattern one\n```";
        let artifacts = extract(response);
        assert_eq!(artifacts, vec![ExtractedArtifact::new("a.go", "from pattern one")]);
    }

    #[test]
    fn earlier_position_wins_within_a_pattern() {
        let response = "```go:a.go\nfirst\n```\n```go:a.go\nsecond\n```";
        assert_eq!(extract(response), vec![ExtractedArtifact::new("a.go", "first")]);
    }

    #[test]
    fn plain_code_block_is_not_an_artifact() {
        assert!(extract("Try this:\n```go\nfmt.Println(1)\n```").is_empty());
        assert!(extract("No code at all.").is_empty());
    }

    #[test]
    fn paths_need_an_extension() {
        assert!(extract("```sh:Makefile\nall:\n```").is_empty());
    }

    #[test]
    fn body_stops_at_first_closing_fence() {
        let response = "```go:a.go\nA\n```\ntext\n```\nnot part of a\n```";
        assert_eq!(extract(response), vec![ExtractedArtifact::new("a.go", "A")]);
    }

    struct Always;

    impl ArtifactMatcher for Always {
        fn name(&self) -> &str {
            "always"
        }
        fn find_all(&self, _response: &str) -> Vec<ExtractedArtifact> {
            vec![ExtractedArtifact::new("fixed.txt", "x")]
        }
    }

    #[test]
    fn custom_matchers_run_after_builtins() {
        let extractor = ArtifactExtractor::builtin().with_matcher(Box::new(Always));
        let artifacts = extractor.extract("```txt:fixed.txt\nfrom builtin\n```");
        assert_eq!(artifacts, vec![ExtractedArtifact::new("fixed.txt", "from builtin")]);
    }
}
