//! Selenium locator generation.
//!
//! - `prompt`: the instructions and user message sent to the model.
//! - `generator`: `LocatorGenerator`, which calls the runtime.
//! - `parse`: clean-up and classification of the model's reply.

mod generator;
mod parse;
mod prompt;

pub use generator::*;
pub use parse::*;
