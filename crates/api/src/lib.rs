//! HTTP surface of the video-generation service: the provider
//! callback webhook, the generation intake endpoint, and health.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
