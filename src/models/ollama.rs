//! Request and response bodies for the Ollama HTTP API.
//!
//! Only the fields this application reads or sends are modelled; unknown
//! fields in responses are ignored by serde.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Chat ---

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message in a chat exchange.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    /// Always false: the caller waits for the complete reply.
    pub stream: bool,
}

/// Non-streamed response of `POST /api/chat`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatResponse {
    pub model: String,
    pub created_at: Option<DateTime<Utc>>,
    pub message: ChatMessage,
    #[serde(default)]
    pub done: bool,
    pub total_duration: Option<u64>,
    pub eval_count: Option<u64>,
}

// --- Model management ---

/// Body of `POST /api/pull`.
#[derive(Debug, Clone, Serialize)]
pub struct PullRequest<'a> {
    pub model: &'a str,
    pub stream: bool,
}

/// One line of the newline-delimited JSON stream returned by `POST /api/pull`.
///
/// Layer downloads report `digest`, `total` and `completed` byte counts. The
/// last line of a successful pull has status `success`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PullStatus {
    #[serde(default)]
    pub status: String,
    pub digest: Option<String>,
    pub total: Option<u64>,
    pub completed: Option<u64>,
    /// Set instead of `status` when the runtime aborts the pull mid-stream.
    pub error: Option<String>,
}

/// Body of `POST /api/generate` used without a prompt to load or unload a model.
#[derive(Debug, Clone, Serialize)]
pub struct LoadRequest<'a> {
    pub model: &'a str,
    pub stream: bool,
    /// `Some(0)` asks the runtime to evict the model immediately.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<i64>,
}

/// Response of a prompt-less `POST /api/generate`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoadResponse {
    pub model: String,
    #[serde(default)]
    pub done: bool,
    /// `"load"` or `"unload"` on current runtimes.
    pub done_reason: Option<String>,
}

/// Descriptive metadata attached to a local model.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ModelDetails {
    pub format: Option<String>,
    pub family: Option<String>,
    pub parameter_size: Option<String>,
    pub quantization_level: Option<String>,
}

/// A model available on disk, from `GET /api/tags`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelSummary {
    pub name: String,
    #[serde(default)]
    pub model: String,
    pub modified_at: DateTime<Utc>,
    pub size: u64,
    pub digest: String,
    #[serde(default)]
    pub details: ModelDetails,
}

/// Response of `GET /api/tags`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<ModelSummary>,
}

/// A model currently loaded in memory, from `GET /api/ps`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunningModel {
    pub name: String,
    #[serde(default)]
    pub model: String,
    pub size: u64,
    #[serde(default)]
    pub size_vram: u64,
    pub digest: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Response of `GET /api/ps`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProcessResponse {
    #[serde(default)]
    pub models: Vec<RunningModel>,
}

/// Response of `GET /api/version`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VersionResponse {
    pub version: String,
}

/// Error body the runtime sends alongside non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct OllamaErrorBody {
    pub error: String,
}
