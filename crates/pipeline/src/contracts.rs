//! Traits for everything the pipeline consumes from the outside
//! world.
//!
//! Orchestration and callback logic are written against these traits
//! only; the Postgres implementations live in [`crate::pg`] and the
//! Telegram one in [`crate::notify`]. Tests substitute in-memory
//! implementations with call counters.

use async_trait::async_trait;
use veobot_core::types::{ChatId, Stars, Timestamp};
use veobot_db::models::generated_video::NewGeneratedVideo;
use veobot_db::models::video_task::{NewVideoTask, VideoTask};

use crate::registry::BotHandle;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Opaque storage failure. Implementations stringify their backend
/// error; callers only log it.
#[derive(Debug, thiserror::Error)]
#[error("Storage error: {0}")]
pub struct StorageError(pub String);

impl From<sqlx::Error> for StorageError {
    fn from(e: sqlx::Error) -> Self {
        Self(e.to_string())
    }
}

/// Ledger failures. Insufficient funds is its own variant because the
/// pipeline treats it as a business outcome, not a fault.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The balance does not cover the debit. Nothing was charged; a
    /// refused-debit audit row was recorded.
    #[error("Insufficient funds: need {required} stars, have {available}")]
    InsufficientFunds { required: Stars, available: Stars },

    /// The debit target does not exist.
    #[error("Unknown user: chat {0}")]
    UnknownUser(ChatId),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        Self::Storage(e.into())
    }
}

/// Outbound delivery failure.
#[derive(Debug, thiserror::Error)]
#[error("Delivery failed: {0}")]
pub struct NotifyError(pub String);

// ---------------------------------------------------------------------------
// Contracts
// ---------------------------------------------------------------------------

/// The star balance ledger.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Debit `amount` stars from the user, recording an audit row for
    /// the applied debit. On insufficient funds nothing is charged, a
    /// FAILED audit row is recorded, and
    /// [`LedgerError::InsufficientFunds`] is returned.
    ///
    /// Returns the balance after the debit.
    async fn debit(
        &self,
        chat_id: ChatId,
        amount: Stars,
        description: &str,
    ) -> Result<Stars, LedgerError>;
}

/// Durable store for asynchronous generation tasks.
///
/// The terminal transitions return `bool`: `false` means the task was
/// not in `processing` (already terminal), and the caller must treat
/// the event as already handled.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create(&self, task: &NewVideoTask) -> Result<(), StorageError>;

    async fn find(&self, task_id: &str) -> Result<Option<VideoTask>, StorageError>;

    async fn complete(
        &self,
        task_id: &str,
        video_url: &str,
        metadata: &serde_json::Value,
        completed_at: Timestamp,
    ) -> Result<bool, StorageError>;

    async fn fail(&self, task_id: &str, error: &str) -> Result<bool, StorageError>;

    /// Replace the metadata blob on a still-processing task.
    async fn update_metadata(
        &self,
        task_id: &str,
        metadata: &serde_json::Value,
    ) -> Result<bool, StorageError>;
}

/// Read-mostly user lookups and the post-delivery level bump.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn exists(&self, chat_id: ChatId) -> Result<bool, StorageError>;

    async fn increment_level(&self, chat_id: ChatId) -> Result<(), StorageError>;
}

/// Archive of delivered assets.
#[async_trait]
pub trait VideoArchive: Send + Sync {
    async fn save(&self, record: &NewGeneratedVideo) -> Result<(), StorageError>;
}

/// Outbound user notifications, addressed through a [`BotHandle`].
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_message(
        &self,
        bot: &BotHandle,
        chat_id: ChatId,
        text: &str,
    ) -> Result<(), NotifyError>;

    async fn send_video(
        &self,
        bot: &BotHandle,
        chat_id: ChatId,
        video_url: &str,
        caption: &str,
    ) -> Result<(), NotifyError>;
}
