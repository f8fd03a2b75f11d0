//! Saving an optimization after the payment decision.
//!
//! Guests get an acknowledged-but-ephemeral save: the response says so via
//! `temporary: true` and no row is written. Authenticated users get a
//! durable record in payment status `pending`, which only the webhook path
//! may finalize.

use axum::extract::State;
use axum::http::HeaderMap;
use serde::Serialize;

use crate::db::{queries, AppState};
use crate::error::{AppError, Result};
use crate::extractors::{session_user_opt, Json};
use crate::models::CreateOptimization;
use crate::pricing;

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub success: bool,
    /// True when nothing was persisted (guest path).
    pub temporary: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// POST /api/optimize/save
pub async fn save_optimization(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateOptimization>,
) -> Result<Json<SaveResponse>> {
    let conn = state.db.get()?;
    let user = session_user_opt(&conn, &headers)?;

    let Some(user) = user else {
        tracing::debug!("guest save acknowledged, nothing persisted");
        return Ok(Json(SaveResponse {
            success: true,
            temporary: true,
            id: None,
        }));
    };

    let tier = pricing::tier_for_word_count(req.word_count)
        .ok_or_else(|| AppError::BadRequest("Invalid word count".into()))?;
    if req.price_cents != tier.price_cents() {
        return Err(AppError::BadRequest("Invalid price".into()));
    }

    let record = queries::create_optimization(&conn, &user.id, &req)?;

    tracing::info!(
        optimization_id = %record.id,
        user_id = %user.id,
        "optimization saved pending payment"
    );

    Ok(Json(SaveResponse {
        success: true,
        temporary: false,
        id: Some(record.id),
    }))
}
