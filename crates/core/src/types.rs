/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Telegram chat/user identifiers are 64-bit signed integers.
pub type ChatId = i64;

/// Star amounts (the platform's internal currency). Always whole stars.
pub type Stars = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
