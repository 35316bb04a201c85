//! Error types for the oli domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context (context sources, generation backend, tools) has its
//! own error enum; [`Error`] wraps them for callers that only need one type.

use thiserror::Error;

/// The top-level error type for all oli operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Context errors ---
    #[error("Context error: {0}")]
    Context(#[from] ContextError),

    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),
}

impl Error {
    /// Whether this error is the operator stopping the operation rather than
    /// something breaking.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Context(e) => e.is_cancelled(),
            Self::Provider(e) => e.is_cancelled(),
            Self::Tool(_) => false,
        }
    }
}

// --- Bounded context errors ---

/// Failures of a single context source.
///
/// The aggregator absorbs these into the source's `ContextUnit`; they are
/// never escalated to a whole-pipeline failure.
#[derive(Debug, Clone, Error)]
pub enum ContextError {
    #[error("Cannot access {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("{0}")]
    Source(String),
}

impl ContextError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    /// An error record reported by the backend in the middle of a stream.
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Generation cancelled")]
    Cancelled,
}

impl ProviderError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Permission denied: {tool_name}: {reason}")]
    PermissionDenied { tool_name: String, reason: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}
