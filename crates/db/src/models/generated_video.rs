//! Models for the `generated_videos` table: the delivered-asset archive.

use serde::Serialize;
use sqlx::FromRow;
use veobot_core::types::{ChatId, DbId, Timestamp};

/// A row from the `generated_videos` table. Written at delivery time.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GeneratedVideo {
    pub id: DbId,
    pub chat_id: ChatId,
    pub video_url: String,
    pub prompt: String,
    /// Catalog model tag, e.g. `"fast"`.
    pub model: String,
    /// Provider that actually produced the asset.
    pub provider: String,
    pub created_at: Timestamp,
}

/// Input for archiving a delivered video.
#[derive(Debug, Clone)]
pub struct NewGeneratedVideo {
    pub chat_id: ChatId,
    pub video_url: String,
    pub prompt: String,
    pub model: String,
    pub provider: String,
}
