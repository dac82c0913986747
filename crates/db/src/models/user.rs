//! Models for the `users` table.

use serde::Serialize;
use sqlx::FromRow;
use veobot_core::request::Locale;
use veobot_core::types::{ChatId, DbId, Stars, Timestamp};

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    /// Telegram user/chat identifier. Unique.
    pub chat_id: ChatId,
    pub username: Option<String>,
    /// Star balance. Never allowed to go negative.
    pub balance: Stars,
    /// Experience level, incremented once per completed generation.
    pub level: i32,
    /// `"en"` or `"ru"`.
    pub locale: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// Notification locale for this user.
    pub fn notification_locale(&self) -> Locale {
        match self.locale.as_str() {
            "ru" => Locale::Ru,
            _ => Locale::En,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(locale: &str) -> User {
        User {
            id: 1,
            chat_id: 42,
            username: Some("alice".into()),
            balance: 100,
            level: 3,
            locale: locale.into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn locale_parses_ru() {
        assert_eq!(user("ru").notification_locale(), Locale::Ru);
    }

    #[test]
    fn unknown_locale_defaults_to_en() {
        assert_eq!(user("de").notification_locale(), Locale::En);
    }
}
