//! Provides a client for interacting with a local Ollama runtime.
//!
//! This module defines the `OllamaClient` struct and its methods for chatting
//! with a model and for managing models on the runtime (pull, load, unload, list).

use crate::error::{AppError, Result};
use crate::models::{
    ChatMessage, ChatRequest, ChatResponse, LoadRequest, LoadResponse, ModelSummary,
    OllamaErrorBody, ProcessResponse, PullRequest, PullStatus, RunningModel, TagsResponse,
    VersionResponse,
};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// An asynchronous client for the Ollama HTTP API.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    timeout: Option<Duration>,
}

impl OllamaClient {
    /// Creates a new `OllamaClient` for the runtime at `base_url`.
    ///
    /// `timeout` bounds each chat, load and listing request end to end; `None`
    /// waits indefinitely. Pulls are never cut off by total duration: the
    /// timeout only applies to the gap between two progress lines.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Api` if the underlying HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends a complete conversation to `model` and waits for the full reply.
    ///
    /// Corresponds to `POST /api/chat` with streaming disabled.
    pub async fn chat(&self, model: &str, messages: &[ChatMessage]) -> Result<ChatResponse> {
        debug!(
            "Sending chat request to model {} with {} messages",
            model,
            messages.len()
        );
        let body = ChatRequest {
            model,
            messages,
            stream: false,
        };
        let response = self.post("/api/chat", &body).await?;
        let reply: ChatResponse = decode(response, "/api/chat").await?;
        debug!(
            "Chat reply from {}: done={}, total_duration={:?}, eval_count={:?}",
            reply.model, reply.done, reply.total_duration, reply.eval_count
        );
        Ok(reply)
    }

    /// Downloads `name` into the runtime's model store.
    ///
    /// Corresponds to a streamed `POST /api/pull`. Every status line is handed
    /// to `on_progress` as it arrives and the last one is returned. A pull may
    /// take as long as the download needs, but fails with `AppError::Timeout`
    /// if the runtime goes silent for longer than the configured timeout.
    pub async fn pull_model<F>(&self, name: &str, mut on_progress: F) -> Result<PullStatus>
    where
        F: FnMut(&PullStatus),
    {
        const ENDPOINT: &str = "/api/pull";
        info!("Pulling model {}", name);
        let body = PullRequest {
            model: name,
            stream: true,
        };
        let url = format!("{}{}", self.base_url, ENDPOINT);
        let sent = self
            .within_timeout(ENDPOINT, self.client.post(&url).json(&body).send())
            .await?;
        let mut response = sent.map_err(|e| {
            error!("Error sending request to {}: {}", url, e);
            AppError::Api(e.into())
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(failure(response, ENDPOINT).await);
        }

        let mut buffer: Vec<u8> = Vec::new();
        let mut last: Option<PullStatus> = None;
        loop {
            let chunk = self
                .within_timeout(ENDPOINT, response.chunk())
                .await?
                .map_err(|e| {
                    error!("Error reading pull stream for {}: {}", name, e);
                    AppError::Api(e.into())
                })?;
            let Some(chunk) = chunk else { break };
            buffer.extend_from_slice(&chunk);
            while let Some(end) = buffer.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=end).collect();
                if let Some(progress) = pull_line(&line, status.as_u16())? {
                    on_progress(&progress);
                    last = Some(progress);
                }
            }
        }
        if let Some(progress) = pull_line(&buffer, status.as_u16())? {
            on_progress(&progress);
            last = Some(progress);
        }

        let last = last.ok_or_else(|| AppError::Ollama {
            status: status.as_u16(),
            message: format!("pull of {} ended without a status", name),
        })?;
        if last.status != "success" {
            warn!("Pull of {} ended with status '{}'", name, last.status);
        }
        info!("Pull of {} finished with status '{}'", name, last.status);
        Ok(last)
    }

    /// Loads `name` into memory so it is ready to serve requests.
    ///
    /// Corresponds to a prompt-less `POST /api/generate`.
    pub async fn load_model(&self, name: &str) -> Result<LoadResponse> {
        info!("Loading model {}", name);
        self.generate_without_prompt(name, None).await
    }

    /// Evicts `name` from memory.
    ///
    /// Corresponds to a prompt-less `POST /api/generate` with `keep_alive: 0`.
    pub async fn unload_model(&self, name: &str) -> Result<LoadResponse> {
        info!("Unloading model {}", name);
        self.generate_without_prompt(name, Some(0)).await
    }

    /// Lists the models available locally.
    ///
    /// Corresponds to `GET /api/tags`.
    pub async fn list_models(&self) -> Result<Vec<ModelSummary>> {
        let response = self.get("/api/tags").await?;
        let tags: TagsResponse = decode(response, "/api/tags").await?;
        debug!("Runtime reports {} local models", tags.models.len());
        Ok(tags.models)
    }

    /// Lists the models currently loaded in memory.
    ///
    /// Corresponds to `GET /api/ps`.
    pub async fn running_models(&self) -> Result<Vec<RunningModel>> {
        let response = self.get("/api/ps").await?;
        let ps: ProcessResponse = decode(response, "/api/ps").await?;
        debug!("Runtime reports {} running models", ps.models.len());
        Ok(ps.models)
    }

    /// Returns the runtime's version string.
    ///
    /// Corresponds to `GET /api/version`.
    pub async fn version(&self) -> Result<String> {
        let response = self.get("/api/version").await?;
        let version: VersionResponse = decode(response, "/api/version").await?;
        Ok(version.version)
    }

    async fn generate_without_prompt(
        &self,
        name: &str,
        keep_alive: Option<i64>,
    ) -> Result<LoadResponse> {
        let body = LoadRequest {
            model: name,
            stream: false,
            keep_alive,
        };
        let response = self.post("/api/generate", &body).await?;
        let reply: LoadResponse = decode(response, "/api/generate").await?;
        debug!(
            "Model {} done={} reason={:?}",
            reply.model, reply.done, reply.done_reason
        );
        Ok(reply)
    }

    async fn post<B: serde::Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response> {
        let url = format!("{}{}", self.base_url, path);
        self.send(self.client.post(&url).json(body), &url).await
    }

    async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url, path);
        self.send(self.client.get(&url), &url).await
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> Result<Response> {
        let request = match self.timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        };
        request.send().await.map_err(|e| {
            error!("Error sending request to {}: {}", url, e);
            AppError::Api(e.into())
        })
    }

    /// Awaits `step`, failing if it takes longer than the configured timeout.
    async fn within_timeout<T>(&self, endpoint: &str, step: impl Future<Output = T>) -> Result<T> {
        match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, step).await.map_err(|_| {
                error!("No data from {} for {:?}", endpoint, timeout);
                AppError::Timeout(format!(
                    "no data from {} for {}s",
                    endpoint,
                    timeout.as_secs_f64()
                ))
            }),
            None => Ok(step.await),
        }
    }
}

/// Parses one NDJSON line of a pull stream. Blank lines yield `None`.
fn pull_line(line: &[u8], status: u16) -> Result<Option<PullStatus>> {
    let text = String::from_utf8_lossy(line);
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    let mut progress: PullStatus = serde_json::from_str(text).map_err(|e| {
        error!("Error parsing pull status line {:?}: {}", text, e);
        AppError::from(e)
    })?;
    if let Some(message) = progress.error.take() {
        error!("Pull aborted by the runtime: {}", message);
        return Err(AppError::Ollama { status, message });
    }
    debug!(
        "Pull status '{}' {:?}/{:?}",
        progress.status, progress.completed, progress.total
    );
    Ok(Some(progress))
}

/// Checks the HTTP status and parses a successful JSON body.
///
/// Non-success statuses become `AppError::Ollama`, carrying the runtime's
/// `{"error": ...}` message when it sent one and the raw body otherwise.
async fn decode<T: DeserializeOwned>(response: Response, endpoint: &str) -> Result<T> {
    if !response.status().is_success() {
        return Err(failure(response, endpoint).await);
    }

    response.json::<T>().await.map_err(|e| {
        error!("Error parsing response JSON from {}: {}", endpoint, e);
        AppError::Api(e.into())
    })
}

async fn failure(response: Response, endpoint: &str) -> AppError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<OllamaErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or_else(|_| {
            if text.trim().is_empty() {
                status.canonical_reason().unwrap_or("unknown error").to_string()
            } else {
                text.trim().to_string()
            }
        });
    error!(
        "Request to {} failed with status {}: {}",
        endpoint, status, message
    );
    if status == reqwest::StatusCode::NOT_FOUND {
        error!("Received 404 Not Found. Check that the model has been pulled.");
    }
    AppError::Ollama {
        status: status.as_u16(),
        message,
    }
}
