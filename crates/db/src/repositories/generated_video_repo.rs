//! Repository for the `generated_videos` table.

use sqlx::PgPool;

use crate::models::generated_video::{GeneratedVideo, NewGeneratedVideo};

/// Column list for `generated_videos` queries.
const COLUMNS: &str = "id, chat_id, video_url, prompt, model, provider, created_at";

/// Archives delivered video assets.
pub struct GeneratedVideoRepo;

impl GeneratedVideoRepo {
    /// Insert a delivered-video record, returning it.
    pub async fn create(
        pool: &PgPool,
        input: &NewGeneratedVideo,
    ) -> Result<GeneratedVideo, sqlx::Error> {
        let query = format!(
            "INSERT INTO generated_videos (chat_id, video_url, prompt, model, provider) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GeneratedVideo>(&query)
            .bind(input.chat_id)
            .bind(&input.video_url)
            .bind(&input.prompt)
            .bind(&input.model)
            .bind(&input.provider)
            .fetch_one(pool)
            .await
    }

    /// List a user's generated videos, newest first.
    pub async fn list_for_chat(
        pool: &PgPool,
        chat_id: i64,
        limit: i64,
    ) -> Result<Vec<GeneratedVideo>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM generated_videos \
             WHERE chat_id = $1 \
             ORDER BY created_at DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, GeneratedVideo>(&query)
            .bind(chat_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
