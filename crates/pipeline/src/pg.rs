//! Postgres implementations of the pipeline contracts, delegating to
//! the `veobot-db` repositories.

use async_trait::async_trait;
use veobot_core::types::{ChatId, Stars, Timestamp};
use veobot_db::models::generated_video::NewGeneratedVideo;
use veobot_db::models::transaction::NewTransaction;
use veobot_db::models::video_task::{NewVideoTask, VideoTask};
use veobot_db::repositories::generated_video_repo::GeneratedVideoRepo;
use veobot_db::repositories::transaction_repo::TransactionRepo;
use veobot_db::repositories::user_repo::UserRepo;
use veobot_db::repositories::video_task_repo::VideoTaskRepo;
use veobot_db::DbPool;

use crate::contracts::{Ledger, LedgerError, StorageError, TaskStore, UserDirectory, VideoArchive};

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

pub struct PgLedger {
    pool: DbPool,
}

impl PgLedger {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Ledger for PgLedger {
    async fn debit(
        &self,
        chat_id: ChatId,
        amount: Stars,
        description: &str,
    ) -> Result<Stars, LedgerError> {
        match UserRepo::debit_stars(&self.pool, chat_id, amount).await? {
            Some(balance) => {
                let row = NewTransaction::debit(chat_id, amount, description);
                if let Err(e) = TransactionRepo::create(&self.pool, &row).await {
                    // The balance already moved; a missing audit row is
                    // a reconciliation concern, not a failed debit.
                    tracing::error!(chat_id, amount, error = %e, "Debit applied but audit row failed");
                }
                Ok(balance)
            }
            None => {
                let Some(available) = UserRepo::balance_of(&self.pool, chat_id).await? else {
                    return Err(LedgerError::UnknownUser(chat_id));
                };
                let row = NewTransaction::refused_debit(chat_id, amount, description);
                if let Err(e) = TransactionRepo::create(&self.pool, &row).await {
                    tracing::warn!(chat_id, amount, error = %e, "Refused-debit audit row failed");
                }
                Err(LedgerError::InsufficientFunds {
                    required: amount,
                    available,
                })
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Task store
// ---------------------------------------------------------------------------

pub struct PgTaskStore {
    pool: DbPool,
}

impl PgTaskStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn create(&self, task: &NewVideoTask) -> Result<(), StorageError> {
        VideoTaskRepo::create(&self.pool, task).await?;
        Ok(())
    }

    async fn find(&self, task_id: &str) -> Result<Option<VideoTask>, StorageError> {
        Ok(VideoTaskRepo::find_by_task_id(&self.pool, task_id).await?)
    }

    async fn complete(
        &self,
        task_id: &str,
        video_url: &str,
        metadata: &serde_json::Value,
        completed_at: Timestamp,
    ) -> Result<bool, StorageError> {
        Ok(VideoTaskRepo::complete(&self.pool, task_id, video_url, metadata, completed_at).await?)
    }

    async fn fail(&self, task_id: &str, error: &str) -> Result<bool, StorageError> {
        Ok(VideoTaskRepo::fail(&self.pool, task_id, error).await?)
    }

    async fn update_metadata(
        &self,
        task_id: &str,
        metadata: &serde_json::Value,
    ) -> Result<bool, StorageError> {
        Ok(VideoTaskRepo::update_metadata(&self.pool, task_id, metadata).await?)
    }
}

// ---------------------------------------------------------------------------
// User directory / archive
// ---------------------------------------------------------------------------

pub struct PgUserDirectory {
    pool: DbPool,
}

impl PgUserDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn exists(&self, chat_id: ChatId) -> Result<bool, StorageError> {
        Ok(UserRepo::find_by_chat_id(&self.pool, chat_id).await?.is_some())
    }

    async fn increment_level(&self, chat_id: ChatId) -> Result<(), StorageError> {
        Ok(UserRepo::increment_level(&self.pool, chat_id).await?)
    }
}

pub struct PgVideoArchive {
    pool: DbPool,
}

impl PgVideoArchive {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoArchive for PgVideoArchive {
    async fn save(&self, record: &NewGeneratedVideo) -> Result<(), StorageError> {
        GeneratedVideoRepo::create(&self.pool, record).await?;
        Ok(())
    }
}
