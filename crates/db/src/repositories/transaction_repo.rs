//! Repository for the `transactions` table (append-only audit log).

use sqlx::PgPool;

use crate::models::transaction::{BalanceTransaction, NewTransaction};

/// Column list for `transactions` queries.
const COLUMNS: &str = "id, chat_id, amount, direction, payment_type, status, description, created_at";

/// Records balance mutations. Rows are never updated or deleted.
pub struct TransactionRepo;

impl TransactionRepo {
    /// Append a transaction row, returning it.
    pub async fn create(
        pool: &PgPool,
        input: &NewTransaction,
    ) -> Result<BalanceTransaction, sqlx::Error> {
        let query = format!(
            "INSERT INTO transactions (chat_id, amount, direction, payment_type, status, description) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BalanceTransaction>(&query)
            .bind(input.chat_id)
            .bind(input.amount)
            .bind(input.direction)
            .bind(input.payment_type)
            .bind(input.status)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    /// List a user's transactions, newest first.
    pub async fn list_for_chat(
        pool: &PgPool,
        chat_id: i64,
        limit: i64,
    ) -> Result<Vec<BalanceTransaction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM transactions \
             WHERE chat_id = $1 \
             ORDER BY created_at DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, BalanceTransaction>(&query)
            .bind(chat_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
