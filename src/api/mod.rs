//! Provides clients for interacting with external APIs.
//!
//! Includes:
//! - `ollama`: Client for a local Ollama runtime.

mod ollama;

pub use ollama::*;
