//! Provider/model catalog: the single source of truth for duration
//! bounds, aspect-ratio support, and per-second pricing.
//!
//! Every call site that needs a clamp bound or a rate reads it from
//! here. No other module may hard-code these numbers.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Providers
// ---------------------------------------------------------------------------

/// External generation backend a model runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Kie.ai VEO API (asynchronous, completes via callback webhook).
    Kie,
    /// Vertex AI Veo API (long-running operation polled to completion).
    Vertex,
}

impl ProviderKind {
    /// Stable name used in logs, captions, and task metadata.
    pub fn name(self) -> &'static str {
        match self {
            Self::Kie => "kie",
            Self::Vertex => "vertex",
        }
    }
}

// ---------------------------------------------------------------------------
// Models
// ---------------------------------------------------------------------------

/// A video-generation model offered to end users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoModel {
    /// Cheap, fast VEO tier on Kie.ai.
    Fast,
    /// Higher-quality VEO tier on Kie.ai.
    Quality,
    /// Vertex AI Veo (the fallback provider's native model).
    Vertex,
}

impl VideoModel {
    /// Stable tag used in task metadata and captions.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Quality => "quality",
            Self::Vertex => "vertex",
        }
    }
}

// ---------------------------------------------------------------------------
// Aspect ratios
// ---------------------------------------------------------------------------

/// Output aspect ratios supported anywhere in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "16:9")]
    Wide,
    #[serde(rename = "9:16")]
    Tall,
    #[serde(rename = "1:1")]
    Square,
}

impl AspectRatio {
    /// Wire representation, e.g. `"16:9"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wide => "16:9",
            Self::Tall => "9:16",
            Self::Square => "1:1",
        }
    }
}

// ---------------------------------------------------------------------------
// Model specs
// ---------------------------------------------------------------------------

/// Static capabilities and pricing for one model.
#[derive(Debug, Clone, Copy)]
pub struct ModelSpec {
    /// Which backend serves this model.
    pub provider: ProviderKind,
    /// Shortest clip the provider accepts, in seconds.
    pub min_duration_secs: u32,
    /// Longest clip the provider accepts, in seconds.
    pub max_duration_secs: u32,
    /// Provider-native price per generated second, in USD.
    pub usd_per_second: f64,
    /// Aspect ratios this model can produce.
    pub aspect_ratios: &'static [AspectRatio],
}

const FAST_SPEC: ModelSpec = ModelSpec {
    provider: ProviderKind::Kie,
    min_duration_secs: 2,
    max_duration_secs: 8,
    usd_per_second: 0.05,
    aspect_ratios: &[AspectRatio::Wide, AspectRatio::Tall, AspectRatio::Square],
};

const QUALITY_SPEC: ModelSpec = ModelSpec {
    provider: ProviderKind::Kie,
    min_duration_secs: 2,
    max_duration_secs: 8,
    usd_per_second: 0.25,
    aspect_ratios: &[AspectRatio::Wide, AspectRatio::Tall, AspectRatio::Square],
};

const VERTEX_SPEC: ModelSpec = ModelSpec {
    provider: ProviderKind::Vertex,
    min_duration_secs: 5,
    max_duration_secs: 8,
    usd_per_second: 0.40,
    aspect_ratios: &[AspectRatio::Wide, AspectRatio::Tall],
};

impl VideoModel {
    /// Static spec for this model.
    pub fn spec(self) -> &'static ModelSpec {
        match self {
            Self::Fast => &FAST_SPEC,
            Self::Quality => &QUALITY_SPEC,
            Self::Vertex => &VERTEX_SPEC,
        }
    }

    /// Clamp a requested duration into this model's supported range.
    ///
    /// Requests below the floor come back as the floor, above the cap
    /// as the cap. Always called before any provider dispatch.
    pub fn clamp_duration(self, requested_secs: u32) -> u32 {
        let spec = self.spec();
        requested_secs.clamp(spec.min_duration_secs, spec.max_duration_secs)
    }

    /// Whether this model can produce the given aspect ratio.
    pub fn supports_aspect_ratio(self, ratio: AspectRatio) -> bool {
        self.spec().aspect_ratios.contains(&ratio)
    }

    /// Validate an aspect ratio, returning a [`CoreError::Validation`]
    /// naming the supported set when it is not in range.
    pub fn require_aspect_ratio(self, ratio: AspectRatio) -> Result<(), CoreError> {
        if self.supports_aspect_ratio(ratio) {
            return Ok(());
        }
        let supported: Vec<&str> = self
            .spec()
            .aspect_ratios
            .iter()
            .map(|r| r.as_str())
            .collect();
        Err(CoreError::Validation(format!(
            "Aspect ratio {} is not supported by model '{}'. Supported: {}",
            ratio.as_str(),
            self.tag(),
            supported.join(", ")
        )))
    }

    /// Catalog estimate of the provider-native cost for a clip of
    /// `duration_secs` (used when a provider does not report cost).
    pub fn estimated_cost_usd(self, duration_secs: u32) -> f64 {
        self.spec().usd_per_second * duration_secs as f64
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Duration clamping --

    #[test]
    fn clamp_above_cap_returns_cap() {
        assert_eq!(VideoModel::Fast.clamp_duration(15), 8);
    }

    #[test]
    fn clamp_below_floor_returns_floor() {
        assert_eq!(VideoModel::Fast.clamp_duration(1), 2);
    }

    #[test]
    fn clamp_in_range_unchanged() {
        assert_eq!(VideoModel::Fast.clamp_duration(5), 5);
    }

    #[test]
    fn clamp_at_exact_bounds_unchanged() {
        assert_eq!(VideoModel::Fast.clamp_duration(2), 2);
        assert_eq!(VideoModel::Fast.clamp_duration(8), 8);
    }

    #[test]
    fn clamp_vertex_floor_is_five() {
        assert_eq!(VideoModel::Vertex.clamp_duration(2), 5);
    }

    // -- Aspect ratios --

    #[test]
    fn kie_models_support_square() {
        assert!(VideoModel::Fast.supports_aspect_ratio(AspectRatio::Square));
        assert!(VideoModel::Quality.supports_aspect_ratio(AspectRatio::Square));
    }

    #[test]
    fn vertex_rejects_square() {
        assert!(!VideoModel::Vertex.supports_aspect_ratio(AspectRatio::Square));
        assert!(VideoModel::Vertex.require_aspect_ratio(AspectRatio::Square).is_err());
    }

    #[test]
    fn require_aspect_ratio_names_supported_set() {
        let err = VideoModel::Vertex
            .require_aspect_ratio(AspectRatio::Square)
            .unwrap_err();
        assert!(err.to_string().contains("16:9, 9:16"));
    }

    // -- Provider routing --

    #[test]
    fn models_map_to_their_serving_providers() {
        assert_eq!(VideoModel::Fast.spec().provider, ProviderKind::Kie);
        assert_eq!(VideoModel::Quality.spec().provider, ProviderKind::Kie);
        assert_eq!(VideoModel::Vertex.spec().provider, ProviderKind::Vertex);
    }

    // -- Pricing --

    #[test]
    fn fast_eight_seconds_costs_forty_cents() {
        assert!((VideoModel::Fast.estimated_cost_usd(8) - 0.4).abs() < 1e-9);
    }

    #[test]
    fn vertex_is_eight_times_fast_rate() {
        let fast = VideoModel::Fast.spec().usd_per_second;
        let vertex = VideoModel::Vertex.spec().usd_per_second;
        assert!((vertex / fast - 8.0).abs() < 1e-9);
    }

    // -- Serde tags --

    #[test]
    fn model_tags_round_trip() {
        for (model, tag) in [
            (VideoModel::Fast, "\"fast\""),
            (VideoModel::Quality, "\"quality\""),
            (VideoModel::Vertex, "\"vertex\""),
        ] {
            assert_eq!(serde_json::to_string(&model).unwrap(), tag);
            let parsed: VideoModel = serde_json::from_str(tag).unwrap();
            assert_eq!(parsed, model);
        }
    }

    #[test]
    fn aspect_ratio_serializes_as_colon_form() {
        assert_eq!(
            serde_json::to_string(&AspectRatio::Wide).unwrap(),
            "\"16:9\""
        );
        let parsed: AspectRatio = serde_json::from_str("\"9:16\"").unwrap();
        assert_eq!(parsed, AspectRatio::Tall);
    }
}
