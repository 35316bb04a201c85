//! # oli core
//!
//! Domain types, traits, and error definitions for the oli code assistant.
//! This crate has **no I/O of its own**; it defines the model that the
//! context, provider, tool, and agent crates implement against.
//!
//! ## Pipeline
//!
//! ```text
//! ContextSource* ─► Vec<ContextUnit> ─► MessagePair ─► Provider ─► text ─► ExtractedArtifact*
//! ```
//!
//! Every seam is a trait here so each stage can be swapped or mocked in tests:
//! - [`ContextSource`] for anything that contributes labeled context
//! - [`Provider`] for the generation backend
//! - [`Prompter`] for operator confirmations

pub mod artifact;
pub mod context;
pub mod error;
pub mod message;
pub mod prompter;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use artifact::ExtractedArtifact;
pub use context::{ContextSource, ContextUnit, WalkBudget};
pub use error::{ContextError, Error, ProviderError, ToolError};
pub use message::MessagePair;
pub use prompter::Prompter;
pub use provider::{FragmentSink, GenerateRequest, Provider};
pub use tokio_util::sync::CancellationToken;
