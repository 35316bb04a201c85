//! The oli assistant pipeline.
//!
//! A run follows one straight line:
//!
//! 1. **Read** files the task mentions (operator confirms each)
//! 2. **Gather** context from every registered source
//! 3. **Assemble** the labeled sections and the task into a prompt
//! 4. **Stream** the response from the provider, echoing it as it arrives
//! 5. **Extract** labeled code blocks and **save** the ones the operator accepts

pub mod extract;
pub mod mentions;
pub mod persist;
pub mod runner;

pub use extract::{ArtifactExtractor, ArtifactMatcher, FencedFileMatcher};
pub use mentions::{mentioned_files, read_mentioned};
pub use persist::{ArtifactPersister, PersistOutcome};
pub use runner::{Assistant, RunSummary};
