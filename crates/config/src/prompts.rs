//! Named system prompts.
//!
//! Built-in prompts are compiled in from `prompts/*.txt`; the config file can
//! add more or replace a built-in by name.

use std::collections::BTreeMap;

pub const DEFAULT_PROMPT: &str = "default";

const BUILTIN: &[(&str, &str)] = &[
    ("default", include_str!("../prompts/default.txt")),
    ("code-review", include_str!("../prompts/code-review.txt")),
    ("explain", include_str!("../prompts/explain.txt")),
    ("refactor", include_str!("../prompts/refactor.txt")),
    ("tests", include_str!("../prompts/tests.txt")),
];

/// A name → system directive map with a guaranteed `default` entry.
#[derive(Debug, Clone)]
pub struct PromptLibrary {
    prompts: BTreeMap<String, String>,
}

impl PromptLibrary {
    pub fn builtin() -> Self {
        Self {
            prompts: BUILTIN
                .iter()
                .map(|(name, text)| (name.to_string(), text.to_string()))
                .collect(),
        }
    }

    pub fn with_overrides(mut self, overrides: &BTreeMap<String, String>) -> Self {
        for (name, text) in overrides {
            self.prompts.insert(name.clone(), text.clone());
        }
        self
    }

    /// Look up a prompt, falling back to `default` for unknown names.
    pub fn get(&self, name: &str) -> &str {
        self.prompts
            .get(name)
            .or_else(|| {
                tracing::warn!(prompt = %name, "Unknown prompt, using default");
                self.prompts.get(DEFAULT_PROMPT)
            })
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.prompts.contains_key(name)
    }

    /// Prompt names in alphabetical order.
    pub fn names(&self) -> Vec<&str> {
        self.prompts.keys().map(String::as_str).collect()
    }
}
