//! Prompt assembly: labeled context sections followed by the task.
//!
//! # Determinism
//!
//! Assembly is a pure function of the directive, the units and the task:
//! identical inputs always produce identical prompts.

use oli_core::{ContextUnit, MessagePair};

/// Turns ordered context units plus a task into a [`MessagePair`].
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    directive: String,
}

impl PromptAssembler {
    /// Create an assembler that uses `directive` as the system message.
    pub fn new(directive: impl Into<String>) -> Self {
        Self {
            directive: directive.into(),
        }
    }

    pub fn directive(&self) -> &str {
        &self.directive
    }

    /// Build the message pair. Units with neither content nor an error are
    /// left out; errored units are kept so the model knows what is missing.
    pub fn build(&self, units: &[ContextUnit], task: &str) -> MessagePair {
        let mut sections: Vec<String> = units.iter().filter_map(render_unit).collect();
        sections.push(format!("## Task\n{task}"));

        MessagePair::new(self.directive.clone(), sections.join("\n\n"))
    }
}

fn render_unit(unit: &ContextUnit) -> Option<String> {
    match &unit.error {
        Some(error) => Some(format!("## Context: {}\n[Error: {error}]", unit.source_name)),
        None if unit.content.is_empty() => None,
        None => Some(format!("## Context: {}\n{}", unit.source_name, unit.content)),
    }
}
