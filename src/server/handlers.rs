//! Request handlers for the locator API.

use super::error::{ApiError, MISSING_FIELDS, RUNTIME_UNAVAILABLE};
use super::AppState;
use crate::locator::unwrap_locator;
use crate::models::{GenerateLocatorRequest, GenerateLocatorResponse, HealthResponse};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::{error, info, warn};

/// `POST /api/generate-locator`
pub async fn generate_locator(
    State(state): State<AppState>,
    payload: Result<Json<GenerateLocatorRequest>, JsonRejection>,
) -> Result<Json<GenerateLocatorResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(
            "Rejected locator request ({} byte body limit): {}",
            state.max_body_bytes,
            rejection.body_text()
        );
        ApiError::from(rejection)
    })?;

    let (html, description) = request
        .required_fields()
        .ok_or_else(|| ApiError::BadRequest(MISSING_FIELDS.to_string()))?;

    let generator = &state.generator;
    // An absent or null `model_name` falls back to the configured default.
    let model = request
        .model_name
        .as_deref()
        .unwrap_or_else(|| generator.default_model());
    info!(
        "Received API request for model '{}' with prompt: '{}'",
        model, description
    );

    match generator.generate(html, description, Some(model)).await {
        Ok(Some(reply)) => Ok(Json(GenerateLocatorResponse {
            locator: unwrap_locator(&reply),
        })),
        Ok(None) => {
            warn!("Model {} returned an empty reply", model);
            Err(ApiError::GenerationFailed)
        },
        Err(e) => {
            error!("Error interacting with Ollama: {}", e);
            Err(ApiError::GenerationFailed)
        },
    }
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.generator.client().version().await {
        Ok(version) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
                ollama: Some(version),
                error: None,
            }),
        ),
        Err(e) => {
            warn!("Health check could not reach Ollama: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "degraded".to_string(),
                    ollama: None,
                    error: Some(RUNTIME_UNAVAILABLE.to_string()),
                }),
            )
        },
    }
}
