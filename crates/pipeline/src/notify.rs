//! Telegram-backed implementation of the [`Notifier`] contract.

use async_trait::async_trait;
use veobot_core::types::ChatId;
use veobot_telegram::TelegramApi;

use crate::contracts::{Notifier, NotifyError};
use crate::registry::BotHandle;

/// Sends user notifications through the Bot API, using the token of
/// whichever bot owns the chat.
pub struct TelegramNotifier {
    api: TelegramApi,
}

impl TelegramNotifier {
    pub fn new(api: TelegramApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_message(
        &self,
        bot: &BotHandle,
        chat_id: ChatId,
        text: &str,
    ) -> Result<(), NotifyError> {
        self.api
            .send_message(&bot.token, chat_id, text)
            .await
            .map_err(|e| NotifyError(e.to_string()))
    }

    async fn send_video(
        &self,
        bot: &BotHandle,
        chat_id: ChatId,
        video_url: &str,
        caption: &str,
    ) -> Result<(), NotifyError> {
        self.api
            .send_video(&bot.token, chat_id, video_url, caption)
            .await
            .map_err(|e| NotifyError(e.to_string()))
    }
}
