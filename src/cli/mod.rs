//! Handles Command Line Interface (CLI) related functionalities.
//!
//! Includes defining commands, parsing arguments, interactive prompts for the
//! menu loop, and table output for model listings.

mod commands;
mod output;
mod prompts;

pub use commands::*;
pub use prompts::*;
