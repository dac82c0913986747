//! The ephemeral generation request and its validation rules.

use serde::{Deserialize, Serialize};

use crate::catalog::{AspectRatio, VideoModel};
use crate::error::CoreError;
use crate::types::ChatId;

// ---------------------------------------------------------------------------
// Requester
// ---------------------------------------------------------------------------

/// Message language for user-facing notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    Ru,
}

impl Default for Locale {
    fn default() -> Self {
        Self::En
    }
}

/// Who asked for the generation and where to deliver the result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Requester {
    /// Telegram chat to deliver the finished video to.
    pub chat_id: ChatId,
    /// Display name, kept in task metadata for audit.
    pub username: String,
    /// Notification language.
    #[serde(default)]
    pub locale: Locale,
}

// ---------------------------------------------------------------------------
// GenerationRequest
// ---------------------------------------------------------------------------

/// One video-generation request, constructed per inbound message.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationRequest {
    /// Text prompt. Must be non-empty after trimming.
    pub prompt: String,
    /// Which catalog model to use.
    pub model: VideoModel,
    /// Requested output aspect ratio.
    pub aspect_ratio: AspectRatio,
    /// Requested clip length in seconds. Clamped to the model's range
    /// before dispatch; see [`VideoModel::clamp_duration`].
    pub duration_secs: u32,
    /// Requester identity and delivery target.
    pub requester: Requester,
    /// Name of the bot instance that owns this chat.
    pub bot_name: String,
    /// Optional image to animate (image-to-video).
    pub source_image_url: Option<String>,
}

impl GenerationRequest {
    /// Validate everything that can be rejected before any provider
    /// call: prompt presence and aspect-ratio support.
    ///
    /// Duration is deliberately *not* validated here -- out-of-range
    /// values are clamped at dispatch, not rejected.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.prompt.trim().is_empty() {
            return Err(CoreError::Validation("Prompt must not be empty".into()));
        }
        self.model.require_aspect_ratio(self.aspect_ratio)?;
        Ok(())
    }

    /// The duration that will actually be dispatched.
    pub fn clamped_duration_secs(&self) -> u32 {
        self.model.clamp_duration(self.duration_secs)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
