//! Artifact persistence: write confirmed artifacts under the working root.

use std::path::{Path, PathBuf};

use oli_core::{ExtractedArtifact, Prompter};
use oli_tools::{resolve_within, write_file};
use tracing::{info, warn};

/// What happened to one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    Saved { filename: String, path: PathBuf, bytes: usize },
    Declined { filename: String },
    /// The filename would land outside the working root.
    Rejected { filename: String, reason: String },
    Failed { filename: String, reason: String },
}

impl PersistOutcome {
    pub fn filename(&self) -> &str {
        match self {
            Self::Saved { filename, .. }
            | Self::Declined { filename }
            | Self::Rejected { filename, .. }
            | Self::Failed { filename, .. } => filename,
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }
}

impl std::fmt::Display for PersistOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Saved { path, bytes, .. } => write!(f, "Saved {} ({bytes} bytes)", path.display()),
            Self::Declined { filename } => write!(f, "Skipped {filename}"),
            Self::Rejected { filename, reason } => write!(f, "Refused {filename}: {reason}"),
            Self::Failed { filename, reason } => write!(f, "Could not save {filename}: {reason}"),
        }
    }
}

/// Asks before writing each artifact.
#[derive(Debug, Clone)]
pub struct ArtifactPersister {
    root: PathBuf,
}

impl ArtifactPersister {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Handle every artifact in order. A declined or failed artifact never
    /// stops the ones after it.
    pub async fn persist_all(
        &self,
        artifacts: &[ExtractedArtifact],
        prompter: &mut dyn Prompter,
    ) -> Vec<PersistOutcome> {
        let mut outcomes = Vec::with_capacity(artifacts.len());
        for artifact in artifacts {
            outcomes.push(self.persist_one(artifact, prompter).await);
        }
        outcomes
    }

    async fn persist_one(
        &self,
        artifact: &ExtractedArtifact,
        prompter: &mut dyn Prompter,
    ) -> PersistOutcome {
        let filename = artifact.filename.clone();

        let path = match resolve_within(&self.root, &artifact.filename) {
            Ok(path) => path,
            Err(e) => {
                warn!(filename = %filename, error = %e, "Refusing to write artifact");
                return PersistOutcome::Rejected {
                    filename,
                    reason: e.to_string(),
                };
            }
        };

        if !prompter.confirm(&format!("Save file '{filename}'?")).await {
            return PersistOutcome::Declined { filename };
        }

        match write_file(&path, &artifact.content).await {
            Ok(bytes) => {
                info!(path = %path.display(), bytes, "Saved artifact");
                PersistOutcome::Saved {
                    filename,
                    path,
                    bytes,
                }
            }
            Err(e) => PersistOutcome::Failed {
                filename,
                reason: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use oli_core::prompter::FixedAnswer;

    /// Answers from a script and records the questions.
    struct Scripted {
        answers: Vec<bool>,
        asked: Vec<String>,
    }

    #[async_trait]
    impl Prompter for Scripted {
        async fn confirm(&mut self, question: &str) -> bool {
            self.asked.push(question.to_string());
            if self.answers.is_empty() {
                false
            } else {
                self.answers.remove(0)
            }
        }
    }

    #[tokio::test]
    async fn saves_confirmed_and_skips_declined() {
        let dir = tempfile::tempdir().unwrap();
        let persister = ArtifactPersister::new(dir.path());
        let artifacts = vec![
            ExtractedArtifact::new("cmd/main.go", "package main"),
            ExtractedArtifact::new("skip.go", "package skip"),
            ExtractedArtifact::new("util.go", "package util"),
        ];
        let mut prompter = Scripted {
            answers: vec![true, false, true],
            asked: Vec::new(),
        };

        let outcomes = persister.persist_all(&artifacts, &mut prompter).await;

        assert_eq!(
            prompter.asked,
            vec![
                "Save file 'cmd/main.go'?",
                "Save file 'skip.go'?",
                "Save file 'util.go'?"
            ]
        );
        assert!(outcomes[0].is_saved());
        assert_eq!(
            outcomes[1],
            PersistOutcome::Declined {
                filename: "skip.go".into()
            }
        );
        assert!(outcomes[2].is_saved());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("cmd/main.go")).unwrap(),
            "package main"
        );
        assert!(!dir.path().join("skip.go").exists());
    }

    #[tokio::test]
    async fn escaping_paths_are_rejected_without_asking() {
        let dir = tempfile::tempdir().unwrap();
        let persister = ArtifactPersister::new(dir.path());
        let artifacts = vec![
            ExtractedArtifact::new("../evil.sh", "rm -rf"),
            ExtractedArtifact::new("/tmp/abs.sh", "x"),
        ];
        let mut prompter = Scripted {
            answers: vec![true, true],
            asked: Vec::new(),
        };

        let outcomes = persister.persist_all(&artifacts, &mut prompter).await;
        assert!(prompter.asked.is_empty());
        assert!(
            outcomes
                .iter()
                .all(|o| matches!(o, PersistOutcome::Rejected { .. }))
        );
    }

    #[tokio::test]
    async fn write_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        // a regular file where a directory is needed
        std::fs::write(dir.path().join("blocker"), "").unwrap();
        let persister = ArtifactPersister::new(dir.path());

        let outcomes = persister
            .persist_all(
                &[ExtractedArtifact::new("blocker/inner.rs", "x")],
                &mut FixedAnswer(true),
            )
            .await;
        assert!(matches!(outcomes[0], PersistOutcome::Failed { .. }));
        assert_eq!(outcomes[0].filename(), "blocker/inner.rs");
    }
}
