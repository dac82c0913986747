//! Conversion from provider-native USD cost to internal stars.
//!
//! Settlement is the only caller. Provider adapters report raw USD;
//! they never convert.

use crate::types::Stars;

// ---------------------------------------------------------------------------
// Exchange constants
// ---------------------------------------------------------------------------

/// USD value of a single star.
pub const STAR_UNIT_PRICE_USD: f64 = 0.016;

/// Markup multiplier applied on top of the provider's raw cost.
pub const COST_MARKUP: f64 = 1.5;

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

/// Convert a provider-native USD cost into stars to debit.
///
/// `stars = ceil(cost_usd * COST_MARKUP / STAR_UNIT_PRICE_USD)`.
/// Rounds up so fractional stars are never given away. Non-finite or
/// negative inputs are treated as zero cost.
pub fn stars_for_cost(cost_usd: f64) -> Stars {
    if !cost_usd.is_finite() || cost_usd <= 0.0 {
        return 0;
    }
    (cost_usd * COST_MARKUP / STAR_UNIT_PRICE_USD).ceil() as Stars
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
