//! Payloads of the locator HTTP API.

use serde::{Deserialize, Serialize};

/// JSON body accepted by `POST /api/generate-locator`.
///
/// All fields are optional at the wire level so that missing values can be
/// reported with a specific message instead of a generic decode error.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GenerateLocatorRequest {
    pub html_data: Option<String>,
    pub user_prompt: Option<String>,
    pub model_name: Option<String>,
}

impl GenerateLocatorRequest {
    /// Returns `(html, description)` when both are present and non-empty.
    pub fn required_fields(&self) -> Option<(&str, &str)> {
        let html = self.html_data.as_deref().filter(|s| !s.is_empty())?;
        let prompt = self.user_prompt.as_deref().filter(|s| !s.is_empty())?;
        Some((html, prompt))
    }
}

/// Successful reply of `POST /api/generate-locator`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerateLocatorResponse {
    pub locator: String,
}

/// Error reply shared by all endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Reply of `GET /health`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ollama: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
