//! Repository for the `users` table.

use sqlx::PgPool;
use veobot_core::types::{ChatId, Stars};

use crate::models::user::User;

/// Column list for `users` queries.
const COLUMNS: &str = "id, chat_id, username, balance, level, locale, created_at, updated_at";

/// Provides lookups and balance/level mutations for users.
pub struct UserRepo;

impl UserRepo {
    /// Find a user by their Telegram chat id.
    pub async fn find_by_chat_id(
        pool: &PgPool,
        chat_id: ChatId,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE chat_id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(chat_id)
            .fetch_optional(pool)
            .await
    }

    /// Current star balance, if the user exists.
    pub async fn balance_of(
        pool: &PgPool,
        chat_id: ChatId,
    ) -> Result<Option<Stars>, sqlx::Error> {
        let row: Option<(Stars,)> =
            sqlx::query_as("SELECT balance FROM users WHERE chat_id = $1")
                .bind(chat_id)
                .fetch_optional(pool)
                .await?;
        Ok(row.map(|r| r.0))
    }

    /// Atomically debit `amount` stars if the balance covers it.
    ///
    /// A single guarded UPDATE serializes concurrent debits against the
    /// same user at the database: two debits whose sum exceeds the
    /// balance cannot both match `balance >= $2`.
    ///
    /// Returns the new balance, or `None` when the user is unknown or
    /// the balance is insufficient (the caller distinguishes via
    /// [`Self::balance_of`]).
    pub async fn debit_stars(
        pool: &PgPool,
        chat_id: ChatId,
        amount: Stars,
    ) -> Result<Option<Stars>, sqlx::Error> {
        let row: Option<(Stars,)> = sqlx::query_as(
            "UPDATE users \
             SET balance = balance - $2, updated_at = NOW() \
             WHERE chat_id = $1 AND balance >= $2 \
             RETURNING balance",
        )
        .bind(chat_id)
        .bind(amount)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|r| r.0))
    }

    /// Increment the user's experience level (terminal side effect of a
    /// delivered generation). Unknown users are a no-op.
    pub async fn increment_level(pool: &PgPool, chat_id: ChatId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET level = level + 1, updated_at = NOW() WHERE chat_id = $1")
            .bind(chat_id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
