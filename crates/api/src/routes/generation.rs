//! Generation intake.
//!
//! Validation happens inline so the caller gets a proper 4xx; the
//! pipeline itself runs on a detached tokio task, because a Kie.ai
//! dispatch returns quickly but a Vertex dispatch polls for minutes
//! and no HTTP client should sit on that.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::post, Json, Router};
use serde_json::json;
use veobot_core::request::GenerationRequest;

use crate::error::AppResult;
use crate::state::AppState;

/// POST /api/v1/generations -- accept a generation request.
async fn submit_generation(
    State(state): State<AppState>,
    Json(request): Json<GenerationRequest>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    request.validate()?;

    let chat_id = request.requester.chat_id;
    let orchestrator = state.orchestrator.clone();
    tokio::spawn(async move {
        match orchestrator.run(request).await {
            Ok(outcome) => {
                tracing::info!(chat_id, ?outcome, "Generation request finished");
            }
            Err(e) => {
                // The orchestrator has already notified the requester
                // where it could; this is the log of record.
                tracing::error!(chat_id, error = %e, "Generation request failed");
            }
        }
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "success": true, "accepted": true })),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/generations", post(submit_generation))
}
