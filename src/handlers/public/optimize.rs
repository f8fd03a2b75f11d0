//! Content submission.
//!
//! Validation is ordered: emptiness, then declared length, then declared
//! price. The first failing check wins, so an over-length submission with a
//! wrong price is reported as over-length. The declared figures only gate
//! admission; the figures in the response come from the server's own count
//! of the trimmed content.

use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::db::AppState;
use crate::error::{AppError, Result};
use crate::extractors::Json;
use crate::models::Suggestions;
use crate::pricing::{self, MAX_WORD_COUNT};
use crate::rewrite::{count_words, RewriteResult};

#[derive(Debug, Deserialize)]
pub struct OptimizeRequest {
    pub content: String,
    /// Word count as the client measured it.
    pub word_count: i64,
    /// Price in cents the client was quoted.
    pub price_cents: i64,
}

#[derive(Debug, Serialize)]
pub struct OptimizeResponse {
    pub original_content: String,
    pub optimized_content: String,
    pub word_count: i64,
    pub price_cents: i64,
    pub suggestions: Suggestions,
}

/// Validate a submission before any provider call is made.
///
/// The declared word count and price must be internally consistent, but
/// pricing never trusts them: the returned word count and price in cents
/// come from recounting the trimmed content.
pub fn validate_submission(content: &str, word_count: i64, price_cents: i64) -> Result<(i64, i64)> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest("Content is required".into()));
    }

    if word_count > MAX_WORD_COUNT {
        return Err(AppError::BadRequest(format!(
            "Content exceeds maximum length of {} words",
            MAX_WORD_COUNT
        )));
    }

    let declared_tier = pricing::tier_for_word_count(word_count)
        .ok_or_else(|| AppError::BadRequest("Invalid word count".into()))?;
    if price_cents != declared_tier.price_cents() {
        return Err(AppError::BadRequest("Invalid price".into()));
    }

    let counted = count_words(trimmed);
    if counted > MAX_WORD_COUNT {
        return Err(AppError::BadRequest(format!(
            "Content exceeds maximum length of {} words",
            MAX_WORD_COUNT
        )));
    }
    let tier = pricing::tier_for_word_count(counted)
        .ok_or_else(|| AppError::BadRequest("Invalid word count".into()))?;

    Ok((counted, tier.price_cents()))
}

/// Assemble the preview. The submitted content is echoed back untouched;
/// only the copy sent to the provider is trimmed.
fn preview_response(
    original_content: String,
    word_count: i64,
    price_cents: i64,
    result: RewriteResult,
) -> OptimizeResponse {
    OptimizeResponse {
        original_content,
        optimized_content: result.optimized_content,
        word_count,
        price_cents,
        suggestions: result.suggestions,
    }
}

/// POST /api/optimize
///
/// Runs the rewriting provider and returns a preview draft. Nothing is
/// persisted here; durability happens at save time, after the payment
/// decision.
pub async fn optimize_content(
    State(state): State<AppState>,
    Json(req): Json<OptimizeRequest>,
) -> Result<Json<OptimizeResponse>> {
    let (word_count, price_cents) =
        validate_submission(&req.content, req.word_count, req.price_cents)?;

    let result = state.rewriter.rewrite(req.content.trim()).await?;

    tracing::info!(word_count, price_cents, "content optimized");

    Ok(Json(preview_response(req.content, word_count, price_cents, result)))
}
