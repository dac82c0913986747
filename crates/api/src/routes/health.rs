use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;
use veobot_core::types::Timestamp;
use veobot_db::repositories::VideoTaskRepo;

use crate::state::AppState;

/// Tasks stuck in `processing` longer than this are counted as stale.
const STALE_TASK_MINUTES: i64 = 30;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status: `healthy` or `degraded`.
    pub status: &'static str,
    /// Crate name, so monitors can tell deployments apart.
    pub service: &'static str,
    /// Server time of the probe.
    pub timestamp: Timestamp,
    /// Whether the database is reachable.
    pub db_healthy: bool,
    /// Tasks awaiting a provider callback past the staleness window.
    /// `None` when the database probe failed.
    pub stale_tasks: Option<i64>,
}

/// GET /health -- returns service and database health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = veobot_db::health_check(&state.pool).await.is_ok();

    let stale_tasks = if db_healthy {
        VideoTaskRepo::count_stale_processing(&state.pool, STALE_TASK_MINUTES)
            .await
            .ok()
    } else {
        None
    };

    let status = if db_healthy { "healthy" } else { "degraded" };

    Json(HealthResponse {
        status,
        service: env!("CARGO_PKG_NAME"),
        timestamp: chrono::Utc::now(),
        db_healthy,
        stale_tasks,
    })
}

/// Mount health check routes at root level.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
