//! HTTP API server.
//!
//! Exposes `POST /api/generate-locator` and `GET /health` on top of a shared
//! [`LocatorGenerator`]. The server stops accepting connections on Ctrl-C and
//! lets in-flight requests finish.

mod error;
mod handlers;
mod routes;

pub use routes::router;

use crate::error::Result;
use crate::locator::LocatorGenerator;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

/// State shared by all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub generator: Arc<LocatorGenerator>,
    /// Largest accepted request body, in bytes.
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(generator: LocatorGenerator, max_body_bytes: usize) -> Self {
        Self {
            generator: Arc::new(generator),
            max_body_bytes,
        }
    }
}

/// Binds `addr` and serves the API until a shutdown signal arrives.
///
/// # Errors
///
/// Returns `AppError::Io` if the address cannot be bound or the server fails.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(addr).await.map_err(|e| {
        error!("Failed to bind {}: {}", addr, e);
        e
    })?;
    info!(
        "Locator API listening on http://{} (default model: {}, Ollama at {}, body limit {} bytes)",
        listener.local_addr()?,
        state.generator.default_model(),
        state.generator.client().base_url(),
        state.max_body_bytes
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received, draining connections");
}

#[cfg(test)]
mod tests {
    use super::error::{
        GENERATION_FAILED, MISSING_FIELDS, NOT_JSON, PAYLOAD_TOO_LARGE, RUNTIME_UNAVAILABLE,
    };
    use super::*;
    use crate::api::OllamaClient;
    use crate::config::DEFAULT_MAX_BODY_BYTES;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use mockito::{Matcher, Server};
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;

    fn state_for(url: &str) -> AppState {
        state_with_limit(url, DEFAULT_MAX_BODY_BYTES)
    }

    fn state_with_limit(url: &str, max_body_bytes: usize) -> AppState {
        let client = OllamaClient::new(url, Some(Duration::from_secs(5))).unwrap();
        AppState::new(LocatorGenerator::new(client, "llama3.2:latest"), max_body_bytes)
    }

    fn page_of(bytes: usize) -> String {
        let row = "<tr><td class='cell'>value</td></tr>";
        let mut html = String::from("<table>");
        while html.len() < bytes {
            html.push_str(row);
        }
        html.push_str("<button id='export'>Export</button></table>");
        html
    }

    fn json_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/generate-locator")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
        let response = router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn chat_reply(content: &str) -> String {
        json!({
            "model": "llama3.2:latest",
            "message": {"role": "assistant", "content": content},
            "done": true
        })
        .to_string()
    }

    #[tokio::test]
    async fn returns_unwrapped_locator_using_default_model() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/api/chat")
            .match_body(Matcher::PartialJson(json!({"model": "llama3.2:latest"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(chat_reply("`xpath=//button[@id='submit-button']`"))
            .create_async()
            .await;

        let (status, body) = send(
            state_for(&server.url()),
            json_request(r#"{"html_data":"<button id='submit-button'>Go</button>","user_prompt":"submit button"}"#),
        )
        .await;

        m.assert_async().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"locator": "xpath=//button[@id='submit-button']"}));
    }

    #[tokio::test]
    async fn honours_requested_model() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/api/chat")
            .match_body(Matcher::PartialJson(json!({"model": "qwen3:0.6b"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(chat_reply("```\nid=main-logo\n```"))
            .create_async()
            .await;

        let (status, body) = send(
            state_for(&server.url()),
            json_request(r#"{"html_data":"<img id='main-logo'>","user_prompt":"logo","model_name":"qwen3:0.6b"}"#),
        )
        .await;

        m.assert_async().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["locator"], "id=main-logo");
    }

    #[tokio::test]
    async fn null_model_name_uses_default_model() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/api/chat")
            .match_body(Matcher::PartialJson(json!({"model": "llama3.2:latest"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(chat_reply("id=save"))
            .create_async()
            .await;

        let (status, body) = send(
            state_for(&server.url()),
            json_request(r#"{"html_data":"<button id='save'/>","user_prompt":"save","model_name":null}"#),
        )
        .await;

        m.assert_async().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["locator"], "id=save");
    }

    #[tokio::test]
    async fn full_page_above_two_megabytes_is_accepted() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/api/chat")
            .match_body(Matcher::PartialJson(json!({"model": "llama3.2:latest"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(chat_reply("id=export"))
            .create_async()
            .await;

        let payload = json!({"html_data": page_of(2_600_000), "user_prompt": "export button"});
        let (status, body) = send(
            state_for(&server.url()),
            json_request(&payload.to_string()),
        )
        .await;

        m.assert_async().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["locator"], "id=export");
    }

    #[tokio::test]
    async fn body_over_limit_is_payload_too_large() {
        let payload = json!({"html_data": page_of(8 * 1024), "user_prompt": "export button"});
        let (status, body) = send(
            state_with_limit("http://127.0.0.1:9", 4 * 1024),
            json_request(&payload.to_string()),
        )
        .await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body, json!({"error": PAYLOAD_TOO_LARGE}));
    }

    #[tokio::test]
    async fn missing_content_type_is_rejected() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/generate-locator")
            .body(Body::from("html_data=<div/>"))
            .unwrap();

        let (status, body) = send(state_for("http://127.0.0.1:9"), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], NOT_JSON);
    }

    #[tokio::test]
    async fn malformed_json_is_rejected() {
        let (status, body) = send(state_for("http://127.0.0.1:9"), json_request("{\"html_data\":")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid JSON payload"));
    }

    #[tokio::test]
    async fn missing_or_empty_fields_are_rejected() {
        for payload in [
            r#"{"html_data":"<div/>"}"#,
            r#"{"user_prompt":"the div"}"#,
            r#"{"html_data":"","user_prompt":"the div"}"#,
            r#"{}"#,
        ] {
            let (status, body) = send(state_for("http://127.0.0.1:9"), json_request(payload)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "payload: {}", payload);
            assert_eq!(body["error"], MISSING_FIELDS);
        }
    }

    #[tokio::test]
    async fn runtime_failure_maps_to_generic_500() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/api/chat")
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":"model 'ghost' not found"}"#)
            .create_async()
            .await;

        let (status, body) = send(
            state_for(&server.url()),
            json_request(r#"{"html_data":"<div/>","user_prompt":"div","model_name":"ghost"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": GENERATION_FAILED}));
    }

    #[tokio::test]
    async fn empty_reply_maps_to_generic_500() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/api/chat")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(chat_reply("  "))
            .create_async()
            .await;

        let (status, body) = send(
            state_for(&server.url()),
            json_request(r#"{"html_data":"<div/>","user_prompt":"div"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], GENERATION_FAILED);
    }

    #[tokio::test]
    async fn health_reports_runtime_version() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/api/version")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"version":"0.6.2"}"#)
            .create_async()
            .await;

        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(state_for(&server.url()), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok", "ollama": "0.6.2"}));
    }

    #[tokio::test]
    async fn health_degrades_when_runtime_is_down() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(state_for("http://127.0.0.1:9"), request).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["error"], RUNTIME_UNAVAILABLE);
        assert!(!body.to_string().contains("127.0.0.1"));
    }
}
