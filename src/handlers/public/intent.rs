//! Payment authorization creation.

use axum::extract::State;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::db::AppState;
use crate::error::{AppError, Result};
use crate::extractors::{session_user, Json};
use crate::payments::IntentTag;
use crate::pricing;

#[derive(Debug, Deserialize)]
pub struct IntentRequest {
    pub amount_cents: i64,
    /// True when the payer chose to continue without an account.
    #[serde(default)]
    pub guest: bool,
}

#[derive(Debug, Serialize)]
pub struct IntentResponse {
    pub payment_intent_id: String,
    pub client_secret: String,
}

/// POST /api/payment/intent
///
/// Guest authorizations carry no identity; authenticated ones require a
/// valid session and are tagged with the user id so the webhook reconciler
/// can find the pending record later.
pub async fn create_payment_intent(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<IntentRequest>,
) -> Result<Json<IntentResponse>> {
    if !pricing::is_valid_price_cents(req.amount_cents) {
        return Err(AppError::BadRequest("Invalid amount".into()));
    }

    let tag = if req.guest {
        IntentTag::Guest
    } else {
        let conn = state.db.get()?;
        let user = session_user(&conn, &headers)?;
        IntentTag::User(user.id)
    };

    let intent = state
        .stripe
        .create_payment_intent(req.amount_cents, "usd", &tag)
        .await?;

    tracing::info!(
        payment_intent_id = %intent.id,
        amount_cents = req.amount_cents,
        guest = req.guest,
        "payment intent created"
    );

    Ok(Json(IntentResponse {
        payment_intent_id: intent.id,
        client_secret: intent.client_secret,
    }))
}
