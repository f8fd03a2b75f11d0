//! Handler-level tests for the save, intent, and auth endpoints

mod common;

use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue};
use common::*;
use smartaicopy::error::AppError;
use smartaicopy::extractors::Json;
use smartaicopy::handlers::public::{
    check_session, create_payment_intent, get_history_entry, list_history, login, logout,
    save_optimization, signup,
};
use smartaicopy::handlers::public::{IntentRequest, LoginRequest};
use smartaicopy::pagination::PaginationQuery;

fn bearer(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        "authorization",
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );
    headers
}

fn save_request() -> CreateOptimization {
    let draft = sample_draft();
    CreateOptimization {
        original_content: draft.original_content,
        optimized_content: draft.optimized_content,
        word_count: draft.word_count,
        price_cents: draft.price_cents,
        suggestions: draft.suggestions,
        payment_intent_id: Some("pi_test_123".to_string()),
    }
}

// ============ Save ============

#[tokio::test]
async fn test_guest_save_is_acknowledged_but_ephemeral() {
    let state = create_test_app_state();

    let response = save_optimization(State(state.clone()), HeaderMap::new(), Json(save_request()))
        .await
        .unwrap();

    assert!(response.0.success);
    assert!(response.0.temporary);
    assert!(response.0.id.is_none());

    let conn = state.db.get().unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM optimizations", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0, "Guest saves must not write records");
}

#[tokio::test]
async fn test_authenticated_save_creates_pending_record() {
    let state = create_test_app_state();
    let token = {
        let conn = state.db.get().unwrap();
        let (_, token) = create_test_user(&conn, "payer@example.com");
        token
    };

    let response = save_optimization(State(state.clone()), bearer(&token), Json(save_request()))
        .await
        .unwrap();

    assert!(response.0.success);
    assert!(!response.0.temporary);
    let id = response.0.id.expect("Durable save returns an id");

    let conn = state.db.get().unwrap();
    let record = queries::get_optimization_by_id(&conn, &id).unwrap().unwrap();
    assert_eq!(record.payment.status, PaymentState::Pending);
    assert_eq!(record.payment.payment_intent_id.as_deref(), Some("pi_test_123"));
}

#[tokio::test]
async fn test_save_rejects_mismatched_price() {
    let state = create_test_app_state();
    let token = {
        let conn = state.db.get().unwrap();
        let (_, token) = create_test_user(&conn, "payer@example.com");
        token
    };

    let mut request = save_request();
    request.price_cents = 5000; // standard-tier word count, long-tier price

    let err = save_optimization(State(state), bearer(&token), Json(request))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

// ============ Payment intent ============

#[tokio::test]
async fn test_intent_rejects_non_canonical_amount() {
    let state = create_test_app_state();

    let request = IntentRequest {
        amount_cents: 1234,
        guest: true,
    };
    let err = create_payment_intent(State(state), HeaderMap::new(), Json(request))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn test_intent_requires_session_when_not_guest() {
    let state = create_test_app_state();

    let request = IntentRequest {
        amount_cents: 2500,
        guest: false,
    };
    let err = create_payment_intent(State(state), HeaderMap::new(), Json(request))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));
}

// ============ Auth ============

#[tokio::test]
async fn test_signup_login_check_logout_cycle() {
    let state = create_test_app_state();

    let response = signup(
        State(state.clone()),
        Json(CreateUser {
            email: "new@example.com".to_string(),
            name: "New User".to_string(),
            password: "long-enough-password".to_string(),
        }),
    )
    .await
    .unwrap();
    assert!(response.0.token.starts_with("sc_sess_"));

    let check = check_session(State(state.clone()), bearer(&response.0.token))
        .await
        .unwrap();
    assert!(check.0.authenticated);
    assert_eq!(check.0.email.as_deref(), Some("new@example.com"));

    let login_response = login(
        State(state.clone()),
        Json(LoginRequest {
            email: "new@example.com".to_string(),
            password: "long-enough-password".to_string(),
        }),
    )
    .await
    .unwrap();
    assert_ne!(login_response.0.token, response.0.token);

    let logout_response = logout(State(state.clone()), bearer(&response.0.token))
        .await
        .unwrap();
    assert!(logout_response.0.success);

    let check = check_session(State(state), bearer(&response.0.token)).await.unwrap();
    assert!(!check.0.authenticated);
}

#[tokio::test]
async fn test_signup_validation() {
    let state = create_test_app_state();

    let err = signup(
        State(state.clone()),
        Json(CreateUser {
            email: "not-an-email".to_string(),
            name: "X".to_string(),
            password: "long-enough-password".to_string(),
        }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = signup(
        State(state),
        Json(CreateUser {
            email: "ok@example.com".to_string(),
            name: "X".to_string(),
            password: "short".to_string(),
        }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn test_login_rejects_wrong_password() {
    let state = create_test_app_state();
    {
        let conn = state.db.get().unwrap();
        create_test_user(&conn, "payer@example.com");
    }

    let err = login(
        State(state),
        Json(LoginRequest {
            email: "payer@example.com".to_string(),
            password: "wrong-password".to_string(),
        }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));
}

// ============ History ============

#[tokio::test]
async fn test_history_requires_session() {
    let state = create_test_app_state();

    let err = list_history(
        State(state),
        HeaderMap::new(),
        smartaicopy::extractors::Query(PaginationQuery::default()),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));
}

#[tokio::test]
async fn test_history_lists_completed_for_owner() {
    let state = create_test_app_state();
    let (user, token) = {
        let conn = state.db.get().unwrap();
        let (user, token) = create_test_user(&conn, "payer@example.com");
        create_pending_optimization(&conn, &user.id);
        assert!(queries::complete_optimization_payment(&conn, &user.id, "pi_1").unwrap());
        create_pending_optimization(&conn, &user.id);
        (user, token)
    };

    let response = list_history(
        State(state.clone()),
        bearer(&token),
        smartaicopy::extractors::Query(PaginationQuery::default()),
    )
    .await
    .unwrap();

    assert_eq!(response.0.total, 1);
    assert_eq!(response.0.items.len(), 1);
    assert_eq!(response.0.items[0].user_id, user.id);

    let entry_id = response.0.items[0].id.clone();
    let entry = get_history_entry(
        State(state.clone()),
        bearer(&token),
        smartaicopy::extractors::Path(entry_id),
    )
    .await
    .unwrap();
    assert_eq!(entry.0.payment.status, PaymentState::Completed);

    // The still-pending record is invisible
    let err = get_history_entry(
        State(state),
        bearer(&token),
        smartaicopy::extractors::Path("sc_opt_missing".to_string()),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
