//! Vertex AI Veo client.
//!
//! Vertex is the synchronous-shaped provider: a submission starts a
//! long-running operation which this client polls until the video is
//! ready, so callers get a [`Dispatch::Completed`] within one call.
//! The polling loop is bounded by a minutes-scale deadline; hitting it
//! behaves exactly like a provider error (the chain falls back or the
//! request fails).

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use veobot_core::catalog::{ProviderKind, VideoModel};

use crate::adapter::{Dispatch, DispatchRequest, ProviderError, ProviderResult, VideoProvider};

/// Overall deadline for one generation (submission + polling).
const DEFAULT_DEADLINE: Duration = Duration::from_secs(600);

/// Delay between operation polls.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Per-HTTP-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Connection configuration for the Vertex AI Veo API.
#[derive(Debug, Clone)]
pub struct VertexConfig {
    /// Regional API endpoint, e.g.
    /// `https://us-central1-aiplatform.googleapis.com`.
    pub base_url: String,
    /// GCP project id.
    pub project_id: String,
    /// Region, e.g. `us-central1`.
    pub location: String,
    /// Published model id, e.g. `veo-2.0-generate-001`.
    pub model_id: String,
    /// OAuth2 access token.
    pub access_token: String,
    /// Overall generation deadline.
    pub deadline: Duration,
    /// Delay between polls of the long-running operation.
    pub poll_interval: Duration,
}

impl VertexConfig {
    /// Config with default deadline and poll interval.
    pub fn new(
        base_url: String,
        project_id: String,
        location: String,
        model_id: String,
        access_token: String,
    ) -> Self {
        Self {
            base_url,
            project_id,
            location,
            model_id,
            access_token,
            deadline: DEFAULT_DEADLINE,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct OperationHandle {
    name: String,
}

#[derive(Debug, Deserialize)]
struct OperationStatus {
    #[serde(default)]
    done: bool,
    #[serde(default)]
    response: Option<OperationResponse>,
    #[serde(default)]
    error: Option<OperationError>,
}

#[derive(Debug, Deserialize)]
struct OperationResponse {
    #[serde(default)]
    videos: Vec<GeneratedSample>,
}

#[derive(Debug, Deserialize)]
struct GeneratedSample {
    #[serde(rename = "gcsUri", default)]
    gcs_uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OperationError {
    #[serde(default)]
    message: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for Vertex AI Veo generation.
pub struct VertexClient {
    client: reqwest::Client,
    config: VertexConfig,
}

impl VertexClient {
    /// Build a client with its own pooled connection.
    pub fn new(config: VertexConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, config })
    }

    /// Fully-qualified model resource path.
    fn model_path(&self) -> String {
        format!(
            "projects/{}/locations/{}/publishers/google/models/{}",
            self.config.project_id, self.config.location, self.config.model_id
        )
    }

    /// Map a non-2xx response to a [`ProviderError`].
    async fn error_for_status(response: reqwest::Response) -> ProviderError {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        match status {
            401 | 403 => ProviderError::Auth(body),
            400 => ProviderError::InvalidRequest(body),
            _ => ProviderError::Api { status, body },
        }
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ProviderError> {
        if !response.status().is_success() {
            return Err(Self::error_for_status(response).await);
        }
        Ok(response.json::<T>().await?)
    }

    /// Start the long-running generation operation.
    ///
    /// `duration_secs` may differ from the request's: when this client
    /// is the fallback for a job clamped against another model's
    /// range, the duration is re-clamped to Vertex's own bounds.
    async fn submit(
        &self,
        request: &DispatchRequest,
        duration_secs: u32,
    ) -> Result<OperationHandle, ProviderError> {
        let mut instance = serde_json::json!({ "prompt": request.prompt });
        if let Some(url) = &request.image_url {
            instance["image"] = serde_json::json!({ "gcsUri": url });
        }

        let body = serde_json::json!({
            "instances": [instance],
            "parameters": {
                "aspectRatio": request.aspect_ratio.as_str(),
                "durationSeconds": duration_secs,
                "sampleCount": 1,
            },
        });

        let response = self
            .client
            .post(format!(
                "{}/v1/{}:predictLongRunning",
                self.config.base_url,
                self.model_path()
            ))
            .bearer_auth(&self.config.access_token)
            .json(&body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Poll the operation once.
    async fn fetch_operation(&self, operation: &str) -> Result<OperationStatus, ProviderError> {
        let body = serde_json::json!({ "operationName": operation });
        let response = self
            .client
            .post(format!(
                "{}/v1/{}:fetchPredictOperation",
                self.config.base_url,
                self.model_path()
            ))
            .bearer_auth(&self.config.access_token)
            .json(&body)
            .send()
            .await?;

        Self::parse_response(response).await
    }
}

#[async_trait]
impl VideoProvider for VertexClient {
    fn name(&self) -> &'static str {
        "vertex"
    }

    /// Fetch the published model's metadata. Read-only and cheap; any
    /// failure (auth, network, missing model) reads as unhealthy.
    async fn check_health(&self) -> bool {
        let result = self
            .client
            .get(format!("{}/v1/{}", self.config.base_url, self.model_path()))
            .bearer_auth(&self.config.access_token)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                tracing::warn!(status = %response.status(), "Vertex health probe returned non-2xx");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "Vertex health probe failed");
                false
            }
        }
    }

    async fn generate(&self, request: &DispatchRequest) -> Result<Dispatch, ProviderError> {
        let duration_secs = VideoModel::Vertex.clamp_duration(request.duration_secs);
        let started = Instant::now();
        let operation = self.submit(request, duration_secs).await?;

        tracing::info!(
            operation = %operation.name,
            chat_id = request.chat_id,
            "Vertex accepted generation job, polling",
        );

        loop {
            if started.elapsed() >= self.config.deadline {
                return Err(ProviderError::Timeout {
                    secs: self.config.deadline.as_secs(),
                });
            }

            tokio::time::sleep(self.config.poll_interval).await;

            let status = self.fetch_operation(&operation.name).await?;
            if !status.done {
                continue;
            }

            if let Some(error) = status.error {
                return Err(ProviderError::InvalidRequest(error.message));
            }

            let video_url = status
                .response
                .and_then(|r| r.videos.into_iter().next())
                .and_then(|v| v.gcs_uri)
                .ok_or_else(|| {
                    ProviderError::InvalidRequest(
                        "Vertex operation finished without a video".to_string(),
                    )
                })?;

            let processing_secs = started.elapsed().as_secs_f64();
            // Vertex does not report per-job cost; the catalog rate is
            // the provider-native price list.
            let cost_usd = VideoModel::Vertex.estimated_cost_usd(duration_secs);

            tracing::info!(
                operation = %operation.name,
                chat_id = request.chat_id,
                processing_secs,
                "Vertex generation complete",
            );

            return Ok(Dispatch::Completed(ProviderResult {
                video_url,
                cost_usd,
                provider: ProviderKind::Vertex.name(),
                model: request.model,
                duration_secs,
                processing_secs: Some(processing_secs),
            }));
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
