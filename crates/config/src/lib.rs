//! Configuration loading, validation, and management for oli.
//!
//! Loads configuration from `~/.oli/config.toml` with environment
//! variable overrides. Validates all settings at startup.

pub mod prompts;

use oli_core::WalkBudget;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub use prompts::PromptLibrary;

/// The root configuration structure.
///
/// Maps directly to `~/.oli/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Model name passed to the backend
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the Ollama server
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,

    /// Name of the system prompt to use
    #[serde(default = "default_prompt")]
    pub prompt: String,

    /// Filesystem traversal limits
    #[serde(default)]
    pub walk: WalkConfig,

    /// Extra named system prompts (override built-ins with the same name)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub prompts: BTreeMap<String, String>,
}

fn default_model() -> String {
    "qwen2.5-coder:14b".into()
}
fn default_ollama_url() -> String {
    "http://localhost:11434".into()
}
fn default_prompt() -> String {
    prompts::DEFAULT_PROMPT.into()
}

/// Budget for the workspace walk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkConfig {
    #[serde(default = "default_max_files")]
    pub max_files: usize,

    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,

    #[serde(default = "default_max_total_bytes")]
    pub max_total_bytes: u64,
}

fn default_max_files() -> usize {
    WalkBudget::default().max_files
}
fn default_max_depth() -> usize {
    WalkBudget::default().max_depth
}
fn default_max_file_bytes() -> u64 {
    WalkBudget::default().max_file_bytes
}
fn default_max_total_bytes() -> u64 {
    WalkBudget::default().max_total_bytes
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            max_files: default_max_files(),
            max_depth: default_max_depth(),
            max_file_bytes: default_max_file_bytes(),
            max_total_bytes: default_max_total_bytes(),
        }
    }
}

impl WalkConfig {
    pub fn budget(&self) -> WalkBudget {
        WalkBudget {
            max_files: self.max_files,
            max_depth: self.max_depth,
            max_file_bytes: self.max_file_bytes,
            max_total_bytes: self.max_total_bytes,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.oli/config.toml).
    ///
    /// Environment variables take precedence over the file:
    /// - `OLLAMA_MODEL`
    /// - `OLLAMA_URL`
    /// - `OLI_PROMPT`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup. Empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(model) = var("OLLAMA_MODEL") {
            self.model = model;
        }
        if let Some(url) = var("OLLAMA_URL") {
            self.ollama_url = url;
        }
        if let Some(prompt) = var("OLI_PROMPT") {
            self.prompt = prompt;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".oli")
    }

    /// Switch to the prompt called `name`. Unknown names are refused so that a
    /// typo on the command line does not silently fall back to `default`.
    pub fn select_prompt(&mut self, name: &str) -> Result<(), ConfigError> {
        let library = self.prompt_library();
        if !library.contains(name) {
            return Err(ConfigError::ValidationError(format!(
                "unknown prompt '{name}' (available: {})",
                library.names().join(", ")
            )));
        }
        self.prompt = name.to_string();
        Ok(())
    }

    /// The prompt library: built-ins plus prompts from this config.
    pub fn prompt_library(&self) -> PromptLibrary {
        PromptLibrary::builtin().with_overrides(&self.prompts)
    }

    /// The system directive selected by `prompt`.
    pub fn system_prompt(&self) -> String {
        self.prompt_library().get(&self.prompt).to_string()
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::ValidationError("model must not be empty".into()));
        }

        if self.ollama_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "ollama_url must not be empty".into(),
            ));
        }

        if self.walk.max_file_bytes > self.walk.max_total_bytes {
            tracing::warn!(
                max_file_bytes = self.walk.max_file_bytes,
                max_total_bytes = self.walk.max_total_bytes,
                "walk.max_file_bytes exceeds walk.max_total_bytes"
            );
        }

        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            ollama_url: default_ollama_url(),
            prompt: default_prompt(),
            walk: WalkConfig::default(),
            prompts: BTreeMap::new(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.model, "qwen2.5-coder:14b");
        assert_eq!(config.ollama_url, "http://localhost:11434");
        assert_eq!(config.walk.budget(), WalkBudget::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.model, config.model);
        assert_eq!(parsed.walk.max_files, config.walk.max_files);
    }

    #[test]
    fn empty_model_rejected() {
        let config = AppConfig {
            model: "  ".into(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn inverted_byte_limits_only_warn() {
        let mut config = AppConfig::default();
        config.walk.max_file_bytes = 10;
        config.walk.max_total_bytes = 5;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.model, "qwen2.5-coder:14b");
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
model = "llama3.1:8b"

[walk]
max_files = 5
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.model, "llama3.1:8b");
        assert_eq!(config.walk.max_files, 5);
        assert_eq!(config.walk.max_depth, 4);
        assert_eq!(config.ollama_url, "http://localhost:11434");
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "model = [").unwrap();
        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = [
            ("OLLAMA_MODEL", "codellama"),
            ("OLLAMA_URL", "http://gpu-box:11434"),
            ("OLI_PROMPT", ""),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.model, "codellama");
        assert_eq!(config.ollama_url, "http://gpu-box:11434");
        // empty values don't override
        assert_eq!(config.prompt, "default");
    }

    #[test]
    fn custom_prompt_selected_from_config() {
        let config: AppConfig = toml::from_str(
            r#"
prompt = "terse"
[prompts]
terse = "Answer in one sentence."
"#,
        )
        .unwrap();
        assert_eq!(config.system_prompt(), "Answer in one sentence.");
    }

    #[test]
    fn select_prompt_accepts_known_names() {
        let mut config = AppConfig::default();
        config
            .prompts
            .insert("terse".into(), "Answer in one word.".into());

        config.select_prompt("code-review").unwrap();
        assert_eq!(config.prompt, "code-review");
        config.select_prompt("terse").unwrap();
        assert_eq!(config.system_prompt(), "Answer in one word.");
    }

    #[test]
    fn select_prompt_refuses_unknown_names() {
        let mut config = AppConfig::default();
        let err = config.select_prompt("code-reveiw").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(ref m) if m.contains("code-review")));
        assert_eq!(config.prompt, "default");
    }
}
