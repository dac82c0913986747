//! HTTP client for the Telegram Bot API.
//!
//! Tokens are passed per call because one deployment serves several
//! bots; the client itself is shared and stateless. Flood-control
//! responses carry `parameters.retry_after` in the body, which is
//! honored verbatim before the next attempt.

use std::time::Duration;

use serde::Deserialize;
use veobot_core::types::ChatId;

/// Per-request HTTP timeout. Video uploads by URL are resolved on
/// Telegram's side, so requests stay small.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Total attempts per API call (first try included).
const MAX_ATTEMPTS: u32 = 3;

/// Fallback delay when Telegram rate-limits without a wait hint.
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    /// The HTTP request itself failed (network, DNS, TLS).
    #[error("Telegram HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Telegram returned `ok: false`.
    #[error("Telegram API error: {description}")]
    Api { description: String },

    /// Rate-limited on every attempt.
    #[error("Telegram flood control persisted after {attempts} attempts")]
    FloodControl { attempts: u32 },
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Envelope of every Bot API response. The `result` payload is never
/// needed here, only success/failure and the flood-control hint.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
struct ResponseParameters {
    #[serde(default)]
    retry_after: Option<u64>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Shared Bot API client.
pub struct TelegramApi {
    client: reqwest::Client,
    base_url: String,
}

impl TelegramApi {
    /// Client against the public `api.telegram.org` endpoint.
    pub fn new() -> Result<Self, TelegramError> {
        Self::with_base_url("https://api.telegram.org".to_string())
    }

    /// Client against a custom endpoint (local Bot API server, tests).
    pub fn with_base_url(base_url: String) -> Result<Self, TelegramError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, base_url })
    }

    /// Send a plain text message.
    pub async fn send_message(
        &self,
        token: &str,
        chat_id: ChatId,
        text: &str,
    ) -> Result<(), TelegramError> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });
        self.call(token, "sendMessage", &body).await
    }

    /// Send a video by URL with a caption. Telegram fetches the asset
    /// itself, so the call succeeds or fails quickly.
    pub async fn send_video(
        &self,
        token: &str,
        chat_id: ChatId,
        video_url: &str,
        caption: &str,
    ) -> Result<(), TelegramError> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "video": video_url,
            "caption": caption,
        });
        self.call(token, "sendVideo", &body).await
    }

    /// Invoke a Bot API method with bounded flood-control retry.
    async fn call(
        &self,
        token: &str,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<(), TelegramError> {
        let url = format!("{}/bot{token}/{method}", self.base_url);

        for attempt in 1..=MAX_ATTEMPTS {
            let response = self.client.post(&url).json(body).send().await?;
            let parsed: ApiResponse = response.json().await?;

            if parsed.ok {
                return Ok(());
            }

            let retry_after = parsed.parameters.and_then(|p| p.retry_after);
            if let Some(secs) = retry_after {
                if attempt < MAX_ATTEMPTS {
                    tracing::warn!(
                        method,
                        chat_id = ?body.get("chat_id"),
                        attempt,
                        retry_after_secs = secs,
                        "Telegram flood control, backing off",
                    );
                    let wait = if secs > 0 {
                        Duration::from_secs(secs)
                    } else {
                        DEFAULT_RETRY_DELAY
                    };
                    tokio::time::sleep(wait).await;
                    continue;
                }
                return Err(TelegramError::FloodControl {
                    attempts: MAX_ATTEMPTS,
                });
            }

            return Err(TelegramError::Api {
                description: parsed
                    .description
                    .unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        Err(TelegramError::FloodControl {
            attempts: MAX_ATTEMPTS,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
