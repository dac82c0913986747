//! The provider completion webhook.
//!
//! The provider treats any non-2xx as "retry later", so status codes
//! are deliberate: 400 strictly for payload-shape problems (missing
//! task id, unrecognized status), 200 for everything the processor
//! handled -- including unknown tasks and duplicate terminal
//! callbacks -- and 500 only for unexpected internal faults.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{routing::post, Json, Router};
use serde::Deserialize;
use serde_json::json;
use veobot_db::models::video_task::TaskStatus;
use veobot_pipeline::callback::{CallbackEvent, EchoedSubmission};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Wire DTO
// ---------------------------------------------------------------------------

/// Raw callback body. Every field is optional so that shape validation
/// (and its 400 response) stays in our hands instead of serde's.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCallback {
    task_id: Option<String>,
    status: Option<String>,
    video_url: Option<String>,
    error: Option<String>,
    progress: Option<f64>,
    duration: Option<u32>,
    cost: Option<f64>,
    #[serde(default)]
    metadata: Option<serde_json::Value>,
}

/// Validate the payload shape and lift it into a typed event.
fn validate(raw: RawCallback) -> Result<CallbackEvent, String> {
    let task_id = raw
        .task_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or("Missing or empty taskId")?
        .to_string();

    let status_str = raw.status.as_deref().unwrap_or("");
    let status = TaskStatus::parse(status_str)
        .ok_or_else(|| format!("Unrecognized status '{status_str}'"))?;

    // Kie.ai echoes the submission parameters and its wall-clock
    // generation time inside the metadata blob. Each key is parsed on
    // its own so a value in the provider's private vocabulary drops to
    // `None` without discarding its neighbors.
    let processing_secs = raw
        .metadata
        .as_ref()
        .and_then(|m| m.get("processingTime"))
        .and_then(serde_json::Value::as_f64);
    let echo = raw
        .metadata
        .as_ref()
        .map(|m| EchoedSubmission {
            model: m
                .get("model")
                .cloned()
                .and_then(|v| serde_json::from_value(v).ok()),
            aspect_ratio: m
                .get("aspectRatio")
                .cloned()
                .and_then(|v| serde_json::from_value(v).ok()),
            prompt: m
                .get("prompt")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string),
        })
        .unwrap_or_default();

    Ok(CallbackEvent {
        task_id,
        status,
        video_url: raw.video_url,
        error: raw.error,
        progress: raw.progress,
        duration_secs: raw.duration,
        cost_usd: raw.cost,
        processing_secs,
        echo,
    })
}

// ---------------------------------------------------------------------------
// Handler
// ---------------------------------------------------------------------------

/// POST /callbacks/video -- apply a provider callback.
async fn receive_callback(
    State(state): State<AppState>,
    Json(raw): Json<RawCallback>,
) -> Response {
    let event = match validate(raw) {
        Ok(event) => event,
        Err(reason) => {
            tracing::warn!(reason = %reason, "Rejected malformed callback");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "error": reason })),
            )
                .into_response();
        }
    };

    match state.callbacks.process(event).await {
        // Every handled outcome is acknowledged, including unknown
        // tasks and duplicate terminal callbacks; the processor has
        // already logged anything that needs attention.
        Ok(_) => (StatusCode::OK, Json(json!({ "success": true }))).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Callback processing failed internally");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": "internal error" })),
            )
                .into_response()
        }
    }
}

/// Mount the callback webhook at root level; the URL is what gets
/// registered with the provider at submission time.
pub fn router() -> Router<AppState> {
    Router::new().route("/callbacks/video", post(receive_callback))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
