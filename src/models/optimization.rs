use serde::{Deserialize, Serialize};

use super::Suggestions;

/// Payment status of a persisted optimization record.
///
/// `Pending` transitions to exactly one of `Completed` or `Failed` via the
/// webhook reconciliation path; both are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    Pending,
    Completed,
    Failed,
}

impl PaymentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::str::FromStr for PaymentState {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for PaymentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment sub-record of an optimization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub status: PaymentState,
    /// Amount in minor currency units.
    pub amount_cents: i64,
    /// ISO 4217 currency code (lowercase, e.g. "usd").
    pub currency: String,
    /// Payment provider's authorization ID, recorded for audit when the
    /// webhook finalizes the record.
    pub payment_intent_id: Option<String>,
    pub completed_at: Option<i64>,
    /// Provider-supplied failure reason (failed records only).
    pub failure_reason: Option<String>,
}

/// A durable optimization record, owned by exactly one user.
///
/// Created only for authenticated users once a payment authorization is
/// accepted client-side; guests never produce one of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Optimization {
    pub id: String,
    pub user_id: String,
    pub original_content: String,
    pub optimized_content: String,
    pub word_count: i64,
    pub price_cents: i64,
    pub suggestions: Suggestions,
    pub payment: PaymentRecord,
    pub created_at: i64,
}

/// Data required to create a new pending optimization record.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOptimization {
    pub original_content: String,
    pub optimized_content: String,
    pub word_count: i64,
    pub price_cents: i64,
    pub suggestions: Suggestions,
    /// Authorization ID accepted client-side, if known at creation time.
    pub payment_intent_id: Option<String>,
}
