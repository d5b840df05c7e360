//! Defines the data structures and models used throughout the application.
//!
//! This includes the wire format of the Ollama runtime API and the request and
//! response bodies of the locator HTTP API.

mod locator;
mod ollama;

pub use locator::*;
pub use ollama::*;
