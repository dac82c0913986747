//! Repository for the `video_tasks` table.
//!
//! Status transitions are guarded in SQL: every terminal transition
//! carries `WHERE status = 'processing'`, so a task that is already
//! `completed` or `failed` can never be overwritten, and a duplicate
//! completion callback observes `rows_affected() == 0` instead of
//! re-running settlement.

use sqlx::PgPool;
use veobot_core::types::Timestamp;

use crate::models::video_task::{NewVideoTask, TaskStatus, VideoTask};

/// Column list for `video_tasks` queries.
const COLUMNS: &str = "\
    id, task_id, status, chat_id, bot_name, locale, metadata, \
    video_url, error_message, completed_at, created_at, updated_at";

/// Provides CRUD operations for asynchronous video tasks.
pub struct VideoTaskRepo;

impl VideoTaskRepo {
    /// Insert a new task in `processing` status.
    ///
    /// The `task_id` column carries a unique constraint
    /// (`uq_video_tasks_task_id`); inserting a duplicate provider task
    /// id surfaces as a conflict, which is the dedup guard for the
    /// asynchronous path.
    pub async fn create(pool: &PgPool, input: &NewVideoTask) -> Result<VideoTask, sqlx::Error> {
        let query = format!(
            "INSERT INTO video_tasks (task_id, status, chat_id, bot_name, locale, metadata) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VideoTask>(&query)
            .bind(&input.task_id)
            .bind(TaskStatus::Processing.as_str())
            .bind(input.chat_id)
            .bind(&input.bot_name)
            .bind(input.locale_str())
            .bind(input.metadata.to_value())
            .fetch_one(pool)
            .await
    }

    /// Find a task by its provider-assigned identifier.
    pub async fn find_by_task_id(
        pool: &PgPool,
        task_id: &str,
    ) -> Result<Option<VideoTask>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM video_tasks WHERE task_id = $1");
        sqlx::query_as::<_, VideoTask>(&query)
            .bind(task_id)
            .fetch_optional(pool)
            .await
    }

    /// Transition `processing -> completed`, storing the asset URL,
    /// the merged metadata, and the completion timestamp.
    ///
    /// Returns `false` when the task was not in `processing` (already
    /// terminal) -- the caller must treat that as already handled.
    pub async fn complete(
        pool: &PgPool,
        task_id: &str,
        video_url: &str,
        metadata: &serde_json::Value,
        completed_at: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE video_tasks \
             SET status = $2, video_url = $3, metadata = $4, \
                 completed_at = $5, updated_at = NOW() \
             WHERE task_id = $1 AND status = $6",
        )
        .bind(task_id)
        .bind(TaskStatus::Completed.as_str())
        .bind(video_url)
        .bind(metadata)
        .bind(completed_at)
        .bind(TaskStatus::Processing.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Transition `processing -> failed`, storing the provider error.
    ///
    /// Returns `false` when the task was already terminal.
    pub async fn fail(pool: &PgPool, task_id: &str, error: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE video_tasks \
             SET status = $2, error_message = $3, completed_at = NOW(), updated_at = NOW() \
             WHERE task_id = $1 AND status = $4",
        )
        .bind(task_id)
        .bind(TaskStatus::Failed.as_str())
        .bind(error)
        .bind(TaskStatus::Processing.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace the metadata blob on a still-processing task (progress
    /// updates). Returns `false` when the task is terminal or unknown.
    pub async fn update_metadata(
        pool: &PgPool,
        task_id: &str,
        metadata: &serde_json::Value,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE video_tasks \
             SET metadata = $2, updated_at = NOW() \
             WHERE task_id = $1 AND status = $3",
        )
        .bind(task_id)
        .bind(metadata)
        .bind(TaskStatus::Processing.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count tasks stuck in `processing` older than `minutes` (an
    /// operational signal, not a protocol violation).
    pub async fn count_stale_processing(
        pool: &PgPool,
        minutes: i64,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM video_tasks \
             WHERE status = $1 AND created_at < NOW() - ($2 * INTERVAL '1 minute')",
        )
        .bind(TaskStatus::Processing.as_str())
        .bind(minutes)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }
}
