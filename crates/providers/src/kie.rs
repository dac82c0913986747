//! Kie.ai VEO API client.
//!
//! Kie.ai is the asynchronous provider: a successful submission
//! returns a task id, and the asset arrives later through the
//! callback webhook. Rate-limit responses (429) are retried honoring
//! the server's `Retry-After` verbatim when present.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use veobot_core::catalog::VideoModel;

use crate::adapter::{Dispatch, DispatchRequest, ProviderError, VideoProvider};
use crate::retry::{next_delay, retry_after, RetryConfig};

/// Default HTTP timeout for Kie.ai calls. Submission is quick; the
/// actual generation happens out-of-band.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Connection configuration for the Kie.ai API.
#[derive(Debug, Clone)]
pub struct KieConfig {
    /// Base URL, e.g. `https://api.kie.ai`.
    pub base_url: String,
    /// Bearer token.
    pub api_key: String,
    /// Public URL of this service's callback webhook, sent with every
    /// submission so Kie.ai knows where to report completion.
    pub callback_url: String,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
    /// Backoff policy for rate-limited submissions.
    pub retry: RetryConfig,
}

impl KieConfig {
    /// Config with default timeout/backoff.
    pub fn new(base_url: String, api_key: String, callback_url: String) -> Self {
        Self {
            base_url,
            api_key,
            callback_url,
            request_timeout: DEFAULT_TIMEOUT,
            retry: RetryConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Kie.ai wraps every response in a `{code, msg, data}` envelope.
#[derive(Debug, Deserialize)]
struct KieEnvelope<T> {
    code: i32,
    msg: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct KieTaskData {
    #[serde(rename = "taskId")]
    task_id: String,
}

/// Envelope code for success.
const KIE_OK: i32 = 200;

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for the Kie.ai VEO endpoints.
pub struct KieClient {
    client: reqwest::Client,
    config: KieConfig,
}

impl KieClient {
    /// Build a client with its own pooled connection.
    pub fn new(config: KieConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { client, config })
    }

    /// Kie.ai model identifier for a catalog model, or `None` for
    /// models this provider does not serve.
    fn kie_model(model: VideoModel) -> Option<&'static str> {
        match model {
            VideoModel::Fast => Some("veo3_fast"),
            VideoModel::Quality => Some("veo3"),
            VideoModel::Vertex => None,
        }
    }

    /// One submission attempt. Returns the raw response so the retry
    /// loop can inspect status and headers.
    async fn try_submit(
        &self,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response, ProviderError> {
        let response = self
            .client
            .post(format!("{}/api/v1/veo/generate", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await?;
        Ok(response)
    }

    /// Map a non-2xx submission response to a [`ProviderError`].
    async fn error_for_status(response: reqwest::Response) -> ProviderError {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        match status {
            401 | 403 => ProviderError::Auth(body),
            400 | 422 => ProviderError::InvalidRequest(body),
            _ => ProviderError::Api { status, body },
        }
    }
}

#[async_trait]
impl VideoProvider for KieClient {
    fn name(&self) -> &'static str {
        "kie"
    }

    /// Probe the credits endpoint. Unreachable or errored means
    /// unhealthy; the chain will skip this provider without spending a
    /// generation request.
    async fn check_health(&self) -> bool {
        let result = self
            .client
            .get(format!("{}/api/v1/common/credit", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                tracing::warn!(status = %response.status(), "Kie.ai health probe returned non-2xx");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "Kie.ai health probe failed");
                false
            }
        }
    }

    async fn generate(&self, request: &DispatchRequest) -> Result<Dispatch, ProviderError> {
        let model = Self::kie_model(request.model).ok_or_else(|| {
            ProviderError::InvalidRequest(format!(
                "Model '{}' is not served by Kie.ai",
                request.model.tag()
            ))
        })?;

        let mut body = serde_json::json!({
            "prompt": request.prompt,
            "model": model,
            "aspectRatio": request.aspect_ratio.as_str(),
            "duration": request.duration_secs,
            "callBackUrl": self.config.callback_url,
        });
        if let Some(url) = &request.image_url {
            body["imageUrls"] = serde_json::json!([url]);
        }

        let mut delay = self.config.retry.initial_delay;
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let response = self.try_submit(&body).await?;

            if response.status().as_u16() == 429 && attempt < self.config.retry.max_attempts {
                // Honor the server-instructed delay verbatim when given.
                let wait = retry_after(response.headers()).unwrap_or(delay);
                tracing::warn!(
                    attempt,
                    wait_ms = wait.as_millis() as u64,
                    chat_id = request.chat_id,
                    "Kie.ai rate-limited submission, backing off",
                );
                tokio::time::sleep(wait).await;
                delay = next_delay(delay, &self.config.retry);
                continue;
            }

            if !response.status().is_success() {
                return Err(Self::error_for_status(response).await);
            }

            let envelope: KieEnvelope<KieTaskData> = response.json().await?;
            if envelope.code != KIE_OK {
                let msg = envelope.msg.unwrap_or_else(|| "unknown error".to_string());
                return Err(ProviderError::InvalidRequest(format!(
                    "Kie.ai error {}: {msg}",
                    envelope.code
                )));
            }

            let data = envelope.data.ok_or_else(|| {
                ProviderError::InvalidRequest("Kie.ai response missing task data".to_string())
            })?;

            tracing::info!(
                task_id = %data.task_id,
                model,
                chat_id = request.chat_id,
                "Kie.ai accepted generation job",
            );

            return Ok(Dispatch::Accepted {
                task_id: data.task_id,
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
