//! Stripe webhook reconciliation.
//!
//! The webhook is the sole authority for finalizing a pending record.
//! Handlers always acknowledge with 2xx once the signature checks out;
//! rejecting a legitimate event only makes Stripe redeliver it.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};

use crate::db::{queries, AppState};
use crate::error::AppError;
use crate::payments::{StripePaymentIntentObject, StripeWebhookEvent};

/// POST /api/payment/webhook
pub async fn handle_stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    let signature = match headers.get("stripe-signature").and_then(|v| v.to_str().ok()) {
        Some(s) => s,
        None => return (StatusCode::BAD_REQUEST, "Missing stripe-signature header"),
    };

    match state.stripe.verify_webhook_signature(&body, signature) {
        Ok(true) => {}
        Ok(false) => return (StatusCode::UNAUTHORIZED, "Invalid signature"),
        Err(AppError::BadRequest(_)) => {
            return (StatusCode::BAD_REQUEST, "Malformed signature header")
        }
        Err(e) => {
            tracing::error!("Webhook signature verification failed: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Verification error");
        }
    }

    let event: StripeWebhookEvent = match serde_json::from_slice(&body) {
        Ok(e) => e,
        Err(e) => {
            tracing::warn!("Unparseable webhook payload: {}", e);
            return (StatusCode::BAD_REQUEST, "Invalid payload");
        }
    };

    match event.event_type.as_str() {
        "payment_intent.succeeded" => handle_intent_succeeded(&state, event).await,
        "payment_intent.payment_failed" => handle_intent_failed(&state, event).await,
        other => {
            tracing::debug!(event_type = other, "webhook event ignored");
            (StatusCode::OK, "Event ignored")
        }
    }
}

fn parse_intent(event: StripeWebhookEvent) -> Option<StripePaymentIntentObject> {
    match serde_json::from_value(event.data.object) {
        Ok(intent) => Some(intent),
        Err(e) => {
            tracing::warn!("Unparseable payment intent object: {}", e);
            None
        }
    }
}

async fn handle_intent_succeeded(
    state: &AppState,
    event: StripeWebhookEvent,
) -> (StatusCode, &'static str) {
    let Some(intent) = parse_intent(event) else {
        return (StatusCode::BAD_REQUEST, "Invalid payment intent object");
    };

    // Guest payments carry no user id and have no record to finalize.
    let Some(user_id) = intent.metadata.user_id.as_deref() else {
        tracing::info!(payment_intent_id = %intent.id, "guest payment succeeded, no record to update");
        return (StatusCode::OK, "No associated record");
    };

    let result = state
        .db
        .get()
        .map_err(AppError::from)
        .and_then(|conn| queries::complete_optimization_payment(&conn, user_id, &intent.id));

    match result {
        Ok(true) => {
            tracing::info!(
                payment_intent_id = %intent.id,
                user_id,
                "payment completed, record unlocked"
            );
            (StatusCode::OK, "Payment recorded")
        }
        Ok(false) => {
            // No pending record: already finalized (redelivery) or the save
            // never happened. Either way redelivery cannot help.
            tracing::warn!(
                payment_intent_id = %intent.id,
                user_id,
                "no pending record for succeeded payment"
            );
            (StatusCode::OK, "No pending record")
        }
        Err(e) => {
            tracing::error!("Failed to record payment completion: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database error")
        }
    }
}

async fn handle_intent_failed(
    state: &AppState,
    event: StripeWebhookEvent,
) -> (StatusCode, &'static str) {
    let Some(intent) = parse_intent(event) else {
        return (StatusCode::BAD_REQUEST, "Invalid payment intent object");
    };

    let Some(user_id) = intent.metadata.user_id.as_deref() else {
        tracing::info!(payment_intent_id = %intent.id, "guest payment failed, no record to update");
        return (StatusCode::OK, "No associated record");
    };

    let reason = intent
        .last_payment_error
        .as_ref()
        .and_then(|e| e.message.as_deref())
        .unwrap_or("Payment failed");

    let result = state
        .db
        .get()
        .map_err(AppError::from)
        .and_then(|conn| queries::fail_optimization_payment(&conn, user_id, &intent.id, reason));

    match result {
        Ok(true) => {
            tracing::info!(payment_intent_id = %intent.id, user_id, reason, "payment marked failed");
            (StatusCode::OK, "Failure recorded")
        }
        Ok(false) => {
            // A completed record is never downgraded to failed.
            tracing::warn!(
                payment_intent_id = %intent.id,
                user_id,
                "no pending record for failed payment"
            );
            (StatusCode::OK, "No pending record")
        }
        Err(e) => {
            tracing::error!("Failed to record payment failure: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database error")
        }
    }
}
