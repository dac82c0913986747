//! The uniform provider interface.
//!
//! A provider either finishes synchronously (the adapter polls the
//! backend to completion and returns the asset) or acknowledges the
//! job and completes later through the callback webhook. Both shapes
//! are expressed by [`Dispatch`], so orchestration code is written
//! once for both.

use async_trait::async_trait;
use veobot_core::catalog::{AspectRatio, VideoModel};
use veobot_core::types::ChatId;

// ---------------------------------------------------------------------------
// Request / result
// ---------------------------------------------------------------------------

/// Provider-agnostic generation parameters.
///
/// `duration_secs` is already clamped to the target model's range by
/// the time a request reaches any adapter.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub prompt: String,
    pub model: VideoModel,
    pub aspect_ratio: AspectRatio,
    pub duration_secs: u32,
    /// Optional image to animate.
    pub image_url: Option<String>,
    /// Requester chat id. Correlation/logging only; never sent to the
    /// provider beyond opaque correlation metadata.
    pub chat_id: ChatId,
}

/// A finished generation as reported by a provider.
///
/// Immutable once constructed; built either from a synchronous call
/// return or from a completion callback.
#[derive(Debug, Clone)]
pub struct ProviderResult {
    pub video_url: String,
    /// Provider-native cost in USD. Star conversion happens in
    /// settlement, never here.
    pub cost_usd: f64,
    /// Provider that produced the asset, e.g. `"kie"`.
    pub provider: &'static str,
    pub model: VideoModel,
    /// Duration actually dispatched, in seconds. A fallback provider
    /// may re-clamp to its own range, so this can differ from the
    /// requested duration.
    pub duration_secs: u32,
    /// Wall-clock processing time, when the provider reports one.
    pub processing_secs: Option<f64>,
}

/// Outcome of a generation call.
#[derive(Debug, Clone)]
pub enum Dispatch {
    /// The provider produced the asset within the call.
    Completed(ProviderResult),
    /// The provider accepted the job; a callback will finish it.
    Accepted {
        /// Provider-assigned task identifier, the dedup key for the
        /// asynchronous completion path.
        task_id: String,
    },
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Provider failures, kept distinguishable so the orchestrator can
/// decide between fallback and abort.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider is down or out of capacity/credits.
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    /// Authentication or authorization was rejected.
    #[error("Provider auth error: {0}")]
    Auth(String),

    /// The provider rejected the request parameters.
    #[error("Provider rejected request: {0}")]
    InvalidRequest(String),

    /// The call did not finish within the configured deadline.
    #[error("Provider call timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The HTTP request itself failed (network, DNS, TLS).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Provider API error ({status}): {body}")]
    Api { status: u16, body: String },
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Uniform interface over heterogeneous video-generation backends.
#[async_trait]
pub trait VideoProvider: Send + Sync {
    /// Stable provider name used in logs, captions, and metadata.
    fn name(&self) -> &'static str;

    /// Cheap, side-effect-free availability probe. The provider chain
    /// calls this before spending a real generation request; `false`
    /// skips this provider entirely for the current dispatch.
    async fn check_health(&self) -> bool;

    /// Start a generation job.
    async fn generate(&self, request: &DispatchRequest) -> Result<Dispatch, ProviderError>;
}
