//! Generation backend implementations for oli.
//!
//! All providers implement the `oli_core::Provider` trait.

pub mod ndjson;
pub mod ollama;

pub use ndjson::{LineTooLong, MAX_LINE_BYTES, NdjsonFramer};
pub use ollama::OllamaProvider;
