//! Word-count-based price schedule.
//!
//! Two discrete price points keyed by a word-count threshold. Content above
//! the hard cap is rejected outright and never reaches the rewriting
//! provider.

use serde::{Deserialize, Serialize};

/// Maximum word count accepted for optimization.
pub const MAX_WORD_COUNT: i64 = 3000;

/// Word-count threshold between the two price tiers.
pub const TIER_THRESHOLD: i64 = 1500;

/// Price tier for an optimization, derived from word count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceTier {
    /// Up to 1500 words.
    Standard,
    /// 1501 to 3000 words.
    Long,
}

impl PriceTier {
    /// Price in minor currency units (cents).
    pub fn price_cents(&self) -> i64 {
        match self {
            Self::Standard => 2500,
            Self::Long => 5000,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Long => "long",
        }
    }
}

/// Derive the price tier from a word count.
///
/// Returns `None` when the content exceeds the hard cap and must be
/// rejected before any provider call.
pub fn tier_for_word_count(word_count: i64) -> Option<PriceTier> {
    if word_count <= 0 || word_count > MAX_WORD_COUNT {
        return None;
    }
    if word_count <= TIER_THRESHOLD {
        Some(PriceTier::Standard)
    } else {
        Some(PriceTier::Long)
    }
}

/// Whether an amount in cents matches one of the two canonical prices.
pub fn is_valid_price_cents(amount_cents: i64) -> bool {
    amount_cents == PriceTier::Standard.price_cents()
        || amount_cents == PriceTier::Long.price_cents()
}
