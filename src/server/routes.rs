use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use tracing::{error, info};

use super::server::AppState;
use super::types::{ApiResponse, ClassifyRequest};
use crate::labels::Prediction;

/// Returns a health check response
pub async fn health_check() -> impl IntoResponse {
    info!("Health check endpoint called");
    Json(json!({ "status": "ok" }))
}

/// Returns the served model's id, labels and declared tensors
pub async fn model_info(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::success(state.info.clone()))
}

/// Classifies the posted text with the loaded model
pub async fn classify(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ClassifyRequest>,
) -> (StatusCode, Json<ApiResponse<Prediction>>) {
    info!("Classify endpoint called with {} characters", request.text.len());

    if request.text.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("text must not be empty")),
        );
    }

    // Execution blocks, so it runs off the async workers
    let worker_state = Arc::clone(&state);
    let outcome = tokio::task::spawn_blocking(move || {
        let mut classifier = worker_state
            .classifier
            .lock()
            .map_err(|e| format!("classifier lock poisoned: {}", e))?;
        classifier.classify(&request.text).map_err(|e| e.to_string())
    })
    .await;

    match outcome {
        Ok(Ok(prediction)) => {
            info!("Classified as {} ({:.4})", prediction.label, prediction.score);
            (StatusCode::OK, Json(ApiResponse::success(prediction)))
        }
        Ok(Err(message)) => {
            error!("Classification failed: {}", message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(format!("Classification failed: {}", message))),
            )
        }
        Err(e) => {
            error!("Classification task failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(format!("Classification task failed: {}", e))),
            )
        }
    }
}
