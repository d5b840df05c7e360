//! Interactive prompts used by the menu loop.

use super::commands::{validate_model_name, GenerateArgs};
use crate::error::Result;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use std::path::PathBuf;

/// Asks for a model name, offering `default` as the pre-filled answer.
pub fn prompt_model(default: &str) -> Result<String> {
    let model: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Model name")
        .default(default.to_string())
        .validate_with(|input: &String| -> std::result::Result<(), String> {
            validate_model_name(input)
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
        .interact_text()?;
    Ok(model.trim().to_string())
}

/// Asks for an optional bind address; an empty answer keeps the configured one.
pub fn prompt_bind_addr() -> Result<Option<String>> {
    let addr: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Bind address (leave empty for default)")
        .allow_empty(true)
        .interact_text()?;
    let addr = addr.trim();
    Ok((!addr.is_empty()).then(|| addr.to_string()))
}

/// Collects everything needed for a one-off locator generation.
pub fn prompt_generate(default_model: &str) -> Result<GenerateArgs> {
    let theme = ColorfulTheme::default();
    let sources = &["Paste HTML", "Read HTML from a file"];
    let source = Select::with_theme(&theme)
        .with_prompt("Where is the HTML?")
        .items(sources)
        .default(0)
        .interact()?;

    let (html, html_file) = if source == 0 {
        let html: String = Input::with_theme(&theme)
            .with_prompt("HTML")
            .interact_text()?;
        (Some(html), None)
    } else {
        let path: String = Input::with_theme(&theme)
            .with_prompt("Path to HTML file")
            .interact_text()?;
        (None, Some(PathBuf::from(path.trim())))
    };

    let prompt: String = Input::with_theme(&theme)
        .with_prompt("Describe the target element")
        .interact_text()?;
    let model = prompt_model(default_model)?;

    Ok(GenerateArgs {
        html,
        html_file,
        prompt,
        model: Some(model),
    })
}
