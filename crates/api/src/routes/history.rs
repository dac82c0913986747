//! Per-user history: delivered videos and the balance audit log.

use axum::extract::{Path, Query, State};
use axum::{routing::get, Json, Router};
use serde::Deserialize;
use veobot_core::types::ChatId;
use veobot_db::models::generated_video::GeneratedVideo;
use veobot_db::models::transaction::BalanceTransaction;
use veobot_db::repositories::{GeneratedVideoRepo, TransactionRepo};

use crate::error::AppResult;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    limit: Option<i64>,
}

impl HistoryQuery {
    fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

/// GET /api/v1/users/{chat_id}/videos -- delivered videos, newest first.
async fn list_videos(
    State(state): State<AppState>,
    Path(chat_id): Path<ChatId>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<GeneratedVideo>>> {
    let videos = GeneratedVideoRepo::list_for_chat(&state.pool, chat_id, query.limit()).await?;
    Ok(Json(videos))
}

/// GET /api/v1/users/{chat_id}/transactions -- balance mutations,
/// newest first, refused debits included.
async fn list_transactions(
    State(state): State<AppState>,
    Path(chat_id): Path<ChatId>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<BalanceTransaction>>> {
    let transactions = TransactionRepo::list_for_chat(&state.pool, chat_id, query.limit()).await?;
    Ok(Json(transactions))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/{chat_id}/videos", get(list_videos))
        .route("/users/{chat_id}/transactions", get(list_transactions))
}
