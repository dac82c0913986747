//! Provider adapters for external video-generation backends.
//!
//! Each backend (Kie.ai, Vertex AI) gets a client implementing the
//! uniform [`adapter::VideoProvider`] trait; callers never see the
//! per-provider request shapes, auth schemes, or completion models.

pub mod adapter;
pub mod kie;
pub mod retry;
pub mod vertex;

pub use adapter::{Dispatch, DispatchRequest, ProviderError, ProviderResult, VideoProvider};
