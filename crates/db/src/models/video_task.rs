//! Models for the `video_tasks` table: the durable record of an
//! in-flight asynchronous generation job.
//!
//! A row is created when a provider acknowledges an asynchronous job
//! and is mutated only along the forward transitions
//! `processing -> completed` and `processing -> failed`. Rows are
//! never deleted; terminal rows are retained for audit.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use veobot_core::catalog::{AspectRatio, VideoModel};
use veobot_core::request::Locale;
use veobot_core::types::{ChatId, DbId, Timestamp};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of a video task. Stored as TEXT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Processing,
    Completed,
    Failed,
}

impl TaskStatus {
    /// Database/wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Parse the stored TEXT value. Unknown values map to `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Whether no further transitions are allowed from this status.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

// ---------------------------------------------------------------------------
// Typed metadata
// ---------------------------------------------------------------------------

/// Current schema version written into [`TaskMetadata::version`].
pub const METADATA_VERSION: i32 = 1;

/// Typed, versioned metadata stored in the `metadata` JSONB column.
///
/// Replaces a free-form JSON merge: every known field is explicit so
/// the write and read sides cannot silently drift apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskMetadata {
    /// Schema version of this blob, see [`METADATA_VERSION`].
    pub version: i32,
    pub model: VideoModel,
    pub aspect_ratio: AspectRatio,
    pub prompt: String,
    pub username: String,
    /// Clamped duration that was dispatched, in seconds.
    pub duration_secs: u32,
    /// Latest provider-reported progress, 0..=100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    /// Provider-reported cost in USD (from the completion callback).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_cost_usd: Option<f64>,
    /// Provider-reported processing time in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_secs: Option<f64>,
}

impl TaskMetadata {
    /// Serialize for the JSONB column.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Deserialize from the JSONB column.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A row from the `video_tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VideoTask {
    pub id: DbId,
    /// Provider-assigned task identifier (unique per provider).
    pub task_id: String,
    /// See [`TaskStatus`]; stored as TEXT.
    pub status: String,
    pub chat_id: ChatId,
    pub bot_name: String,
    /// `"en"` or `"ru"`.
    pub locale: String,
    /// Typed metadata blob, see [`TaskMetadata`].
    pub metadata: serde_json::Value,
    pub video_url: Option<String>,
    pub error_message: Option<String>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl VideoTask {
    /// Parsed status. Unknown stored values are treated as terminal
    /// failures so they are never re-processed.
    pub fn task_status(&self) -> TaskStatus {
        TaskStatus::parse(&self.status).unwrap_or(TaskStatus::Failed)
    }

    /// Parsed metadata, if the blob matches the current schema.
    pub fn task_metadata(&self) -> Option<TaskMetadata> {
        TaskMetadata::from_value(&self.metadata)
    }

    /// Notification locale for this task's requester.
    pub fn requester_locale(&self) -> Locale {
        match self.locale.as_str() {
            "ru" => Locale::Ru,
            _ => Locale::En,
        }
    }
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// Input for inserting a new `processing` task row.
#[derive(Debug, Clone)]
pub struct NewVideoTask {
    pub task_id: String,
    pub chat_id: ChatId,
    pub bot_name: String,
    pub locale: Locale,
    pub metadata: TaskMetadata,
}

impl NewVideoTask {
    /// TEXT value for the `locale` column.
    pub fn locale_str(&self) -> &'static str {
        match self.locale {
            Locale::En => "en",
            Locale::Ru => "ru",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
