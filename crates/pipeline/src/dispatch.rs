//! Ordered provider chain with health-probe fallback.
//!
//! For each provider in order: probe health first and skip the
//! provider entirely when the probe fails, otherwise attempt the
//! generation. The first success wins; when every provider is
//! unhealthy or errors, the dispatch fails as a whole. Adding a
//! provider is a data change (one more element in the list), not a
//! code change.

use std::sync::Arc;

use veobot_providers::{Dispatch, DispatchRequest, VideoProvider};

/// Chain-level failure. Per-provider errors are logged at the point
/// of failure; the caller only needs to know that nothing succeeded.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("No providers configured")]
    NoProviders,

    #[error("All {attempted} providers failed or were unhealthy")]
    AllProvidersFailed { attempted: usize },
}

/// Ordered list of provider adapters; earlier entries are preferred.
pub struct ProviderChain {
    providers: Vec<Arc<dyn VideoProvider>>,
}

impl ProviderChain {
    pub fn new(providers: Vec<Arc<dyn VideoProvider>>) -> Self {
        Self { providers }
    }

    /// Dispatch a generation to the first healthy, willing provider.
    ///
    /// Returns the outcome together with the name of the provider that
    /// produced it.
    pub async fn dispatch(
        &self,
        request: &DispatchRequest,
    ) -> Result<(Dispatch, &'static str), DispatchError> {
        if self.providers.is_empty() {
            return Err(DispatchError::NoProviders);
        }

        for provider in &self.providers {
            let name = provider.name();

            if !provider.check_health().await {
                tracing::warn!(
                    provider = name,
                    chat_id = request.chat_id,
                    "Provider unhealthy, skipping",
                );
                continue;
            }

            match provider.generate(request).await {
                Ok(dispatch) => {
                    tracing::info!(
                        provider = name,
                        chat_id = request.chat_id,
                        model = request.model.tag(),
                        "Provider accepted dispatch",
                    );
                    return Ok((dispatch, name));
                }
                Err(e) => {
                    tracing::warn!(
                        provider = name,
                        chat_id = request.chat_id,
                        error = %e,
                        "Provider failed, falling through",
                    );
                }
            }
        }

        Err(DispatchError::AllProvidersFailed {
            attempted: self.providers.len(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use veobot_core::catalog::{AspectRatio, VideoModel};
    use veobot_providers::{ProviderError, ProviderResult};

    use super::*;

    struct FakeProvider {
        name: &'static str,
        healthy: bool,
        fails: bool,
        health_calls: AtomicUsize,
        generate_calls: AtomicUsize,
    }

    impl FakeProvider {
        fn new(name: &'static str, healthy: bool, fails: bool) -> Arc<Self> {
            Arc::new(Self {
                name,
                healthy,
                fails,
                health_calls: AtomicUsize::new(0),
                generate_calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl VideoProvider for FakeProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn check_health(&self) -> bool {
            self.health_calls.fetch_add(1, Ordering::SeqCst);
            self.healthy
        }

        async fn generate(&self, _request: &DispatchRequest) -> Result<Dispatch, ProviderError> {
            self.generate_calls.fetch_add(1, Ordering::SeqCst);
            if self.fails {
                return Err(ProviderError::Unavailable("out of credits".into()));
            }
            Ok(Dispatch::Completed(ProviderResult {
                video_url: "https://cdn.example/video.mp4".into(),
                cost_usd: 0.4,
                provider: self.name,
                model: VideoModel::Fast,
                duration_secs: 8,
                processing_secs: None,
            }))
        }
    }

    fn request() -> DispatchRequest {
        DispatchRequest {
            prompt: "cat".into(),
            model: VideoModel::Fast,
            aspect_ratio: AspectRatio::Wide,
            duration_secs: 8,
            image_url: None,
            chat_id: 42,
        }
    }

    #[tokio::test]
    async fn unhealthy_primary_is_never_asked_to_generate() {
        let primary = FakeProvider::new("kie", false, false);
        let secondary = FakeProvider::new("vertex", true, false);
        let chain = ProviderChain::new(vec![primary.clone(), secondary.clone()]);

        let (_, name) = chain.dispatch(&request()).await.unwrap();

        assert_eq!(name, "vertex");
        assert_eq!(primary.generate_calls.load(Ordering::SeqCst), 0);
        assert_eq!(secondary.generate_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn healthy_primary_wins_without_touching_secondary() {
        let primary = FakeProvider::new("kie", true, false);
        let secondary = FakeProvider::new("vertex", true, false);
        let chain = ProviderChain::new(vec![primary.clone(), secondary.clone()]);

        let (_, name) = chain.dispatch(&request()).await.unwrap();

        assert_eq!(name, "kie");
        assert_eq!(secondary.health_calls.load(Ordering::SeqCst), 0);
        assert_eq!(secondary.generate_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failing_primary_falls_through_to_secondary() {
        let primary = FakeProvider::new("kie", true, true);
        let secondary = FakeProvider::new("vertex", true, false);
        let chain = ProviderChain::new(vec![primary.clone(), secondary.clone()]);

        let (_, name) = chain.dispatch(&request()).await.unwrap();

        assert_eq!(name, "vertex");
        assert_eq!(primary.generate_calls.load(Ordering::SeqCst), 1);
        assert_eq!(secondary.generate_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn all_failed_is_a_chain_error() {
        let primary = FakeProvider::new("kie", false, false);
        let secondary = FakeProvider::new("vertex", true, true);
        let chain = ProviderChain::new(vec![primary, secondary]);

        let err = chain.dispatch(&request()).await.unwrap_err();
        assert_matches!(err, DispatchError::AllProvidersFailed { attempted: 2 });
    }

    #[tokio::test]
    async fn empty_chain_is_an_error() {
        let chain = ProviderChain::new(vec![]);
        let err = chain.dispatch(&request()).await.unwrap_err();
        assert_matches!(err, DispatchError::NoProviders);
    }
}
