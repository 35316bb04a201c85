//! The prompt value object handed from the assembler to the provider.

use serde::{Deserialize, Serialize};

/// A (system, user) message pair for a single generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePair {
    /// The system directive, unmodified.
    pub system: String,

    /// Labeled context sections followed by the task.
    pub user: String,
}

impl MessagePair {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}
