use serde::{Deserialize, Serialize};

/// SEO suggestions produced by the rewriting provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestions {
    /// Ordered title suggestions (best first).
    pub titles: Vec<String>,
    pub keywords: Vec<String>,
    pub meta_description: String,
}

/// An in-progress, not-yet-paid-for optimization result.
///
/// Held only client-side (see `flow::store`); it has no durable identity
/// until a payment completes for an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationDraft {
    pub original_content: String,
    pub optimized_content: String,
    pub word_count: i64,
    /// Price in minor currency units, derived from word count at submission.
    pub price_cents: i64,
    pub suggestions: Suggestions,
}
