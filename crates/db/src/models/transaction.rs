//! Models for the `transactions` table: every balance mutation gets a
//! row, including refused debits (recorded as FAILED for audit).

use serde::Serialize;
use sqlx::FromRow;
use veobot_core::types::{ChatId, DbId, Stars, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Stars added to the balance.
pub const DIRECTION_INCOME: &str = "income";
/// Stars removed from the balance.
pub const DIRECTION_OUTCOME: &str = "outcome";

/// The mutation was applied.
pub const STATUS_COMPLETED: &str = "COMPLETED";
/// The mutation was refused (e.g. insufficient funds). Balance untouched.
pub const STATUS_FAILED: &str = "FAILED";

/// Payment type tag for video-generation settlements.
pub const PAYMENT_TYPE_VIDEO_GENERATION: &str = "video_generation";

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A row from the `transactions` table. Immutable once written.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BalanceTransaction {
    pub id: DbId,
    pub chat_id: ChatId,
    /// Magnitude in stars; always positive, direction carries the sign.
    pub amount: Stars,
    /// [`DIRECTION_INCOME`] or [`DIRECTION_OUTCOME`].
    pub direction: String,
    /// Free-form tag, e.g. [`PAYMENT_TYPE_VIDEO_GENERATION`].
    pub payment_type: String,
    /// [`STATUS_COMPLETED`] or [`STATUS_FAILED`].
    pub status: String,
    pub description: String,
    pub created_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// Input for recording a balance mutation.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub chat_id: ChatId,
    pub amount: Stars,
    pub direction: &'static str,
    pub payment_type: &'static str,
    pub status: &'static str,
    pub description: String,
}

impl NewTransaction {
    /// A completed outcome (debit) row.
    pub fn debit(chat_id: ChatId, amount: Stars, description: impl Into<String>) -> Self {
        Self {
            chat_id,
            amount,
            direction: DIRECTION_OUTCOME,
            payment_type: PAYMENT_TYPE_VIDEO_GENERATION,
            status: STATUS_COMPLETED,
            description: description.into(),
        }
    }

    /// A refused outcome row, kept for reconciliation audits.
    pub fn refused_debit(chat_id: ChatId, amount: Stars, description: impl Into<String>) -> Self {
        Self {
            status: STATUS_FAILED,
            ..Self::debit(chat_id, amount, description)
        }
    }
}
