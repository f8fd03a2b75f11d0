//! Database query tests: accounts, sessions, and record transitions

mod common;

use common::*;

// ============ Users and sessions ============

#[test]
fn test_create_user_normalizes_email() {
    let conn = setup_test_db();
    let input = CreateUser {
        email: "  Payer@Example.COM ".to_string(),
        name: "Payer".to_string(),
        password: "test-password-123".to_string(),
    };
    let user = queries::create_user(&conn, &input).unwrap();
    assert_eq!(user.email, "payer@example.com");
    assert!(user.id.starts_with("sc_usr_"));

    let found = queries::get_user_by_email(&conn, "payer@example.com").unwrap();
    assert!(found.is_some());
}

#[test]
fn test_duplicate_email_conflicts() {
    let conn = setup_test_db();
    create_test_user(&conn, "payer@example.com");

    let input = CreateUser {
        email: "payer@example.com".to_string(),
        name: "Other".to_string(),
        password: "another-password".to_string(),
    };
    let err = queries::create_user(&conn, &input).unwrap_err();
    assert!(matches!(err, smartaicopy::error::AppError::Conflict(_)));
}

#[test]
fn test_password_verification() {
    let conn = setup_test_db();
    let (user, _) = create_test_user(&conn, "payer@example.com");

    assert!(queries::verify_password(&user, "test-password-123"));
    assert!(!queries::verify_password(&user, "wrong-password"));
    assert!(!queries::verify_password(&user, ""));
}

#[test]
fn test_session_token_round_trip() {
    let conn = setup_test_db();
    let (user, token) = create_test_user(&conn, "payer@example.com");

    assert!(token.starts_with("sc_sess_"));

    let found = queries::get_user_by_session_token(&conn, &token).unwrap().unwrap();
    assert_eq!(found.id, user.id);

    assert!(queries::get_user_by_session_token(&conn, "sc_sess_bogus").unwrap().is_none());
}

#[test]
fn test_raw_token_is_not_stored() {
    let conn = setup_test_db();
    let (_, token) = create_test_user(&conn, "payer@example.com");

    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sessions WHERE token_hash = ?1",
            rusqlite::params![&token],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(count, 0, "Only the token hash may be persisted");
}

#[test]
fn test_delete_session_invalidates_token() {
    let conn = setup_test_db();
    let (_, token) = create_test_user(&conn, "payer@example.com");

    assert!(queries::delete_session(&conn, &token).unwrap());
    assert!(queries::get_user_by_session_token(&conn, &token).unwrap().is_none());
    assert!(!queries::delete_session(&conn, &token).unwrap());
}

// ============ Optimization records ============

#[test]
fn test_new_record_starts_pending() {
    let conn = setup_test_db();
    let (user, _) = create_test_user(&conn, "payer@example.com");
    let record = create_pending_optimization(&conn, &user.id);

    assert!(record.id.starts_with("sc_opt_"));
    assert_eq!(record.payment.status, PaymentState::Pending);
    assert_eq!(record.payment.amount_cents, 2500);
    assert_eq!(record.payment.currency, "usd");

    let fetched = queries::get_optimization_by_id(&conn, &record.id).unwrap().unwrap();
    assert_eq!(fetched.payment.status, PaymentState::Pending);
    assert_eq!(fetched.suggestions, record.suggestions);
}

#[test]
fn test_complete_transitions_only_pending() {
    let conn = setup_test_db();
    let (user, _) = create_test_user(&conn, "payer@example.com");
    create_pending_optimization(&conn, &user.id);

    assert!(queries::complete_optimization_payment(&conn, &user.id, "pi_1").unwrap());
    // Second delivery finds no pending record
    assert!(!queries::complete_optimization_payment(&conn, &user.id, "pi_1").unwrap());
}

#[test]
fn test_fail_does_not_touch_completed() {
    let conn = setup_test_db();
    let (user, _) = create_test_user(&conn, "payer@example.com");
    let record = create_pending_optimization(&conn, &user.id);

    assert!(queries::complete_optimization_payment(&conn, &user.id, "pi_1").unwrap());
    assert!(!queries::fail_optimization_payment(&conn, &user.id, "pi_1", "card declined").unwrap());

    let fetched = queries::get_optimization_by_id(&conn, &record.id).unwrap().unwrap();
    assert_eq!(fetched.payment.status, PaymentState::Completed);
}

#[test]
fn test_complete_touches_only_the_matching_record() {
    let conn = setup_test_db();
    let (user, _) = create_test_user(&conn, "payer@example.com");

    let unpaid = create_pending_with_intent(&conn, &user.id, Some("pi_unpaid"));
    let paid = create_pending_with_intent(&conn, &user.id, Some("pi_paid"));

    assert!(queries::complete_optimization_payment(&conn, &user.id, "pi_paid").unwrap());

    let paid = queries::get_optimization_by_id(&conn, &paid.id).unwrap().unwrap();
    assert_eq!(paid.payment.status, PaymentState::Completed);
    assert_eq!(paid.payment.payment_intent_id.as_deref(), Some("pi_paid"));

    let unpaid = queries::get_optimization_by_id(&conn, &unpaid.id).unwrap().unwrap();
    assert_eq!(unpaid.payment.status, PaymentState::Pending);
    assert_eq!(unpaid.payment.payment_intent_id.as_deref(), Some("pi_unpaid"));
    assert_eq!(queries::count_completed_optimizations(&conn, &user.id).unwrap(), 1);
}

#[test]
fn test_complete_prefers_exact_intent_match() {
    let conn = setup_test_db();
    let (user, _) = create_test_user(&conn, "payer@example.com");

    // One record saved before its intent id was known, one tied to an id.
    let untagged = create_pending_with_intent(&conn, &user.id, None);
    let tagged = create_pending_with_intent(&conn, &user.id, Some("pi_exact"));

    assert!(queries::complete_optimization_payment(&conn, &user.id, "pi_exact").unwrap());

    let tagged = queries::get_optimization_by_id(&conn, &tagged.id).unwrap().unwrap();
    assert_eq!(tagged.payment.status, PaymentState::Completed);
    let untagged = queries::get_optimization_by_id(&conn, &untagged.id).unwrap().unwrap();
    assert_eq!(untagged.payment.status, PaymentState::Pending);
}

#[test]
fn test_fail_touches_only_the_matching_record() {
    let conn = setup_test_db();
    let (user, _) = create_test_user(&conn, "payer@example.com");

    let kept = create_pending_with_intent(&conn, &user.id, Some("pi_kept"));
    create_pending_with_intent(&conn, &user.id, Some("pi_declined"));

    assert!(queries::fail_optimization_payment(&conn, &user.id, "pi_declined", "card declined").unwrap());

    let kept = queries::get_optimization_by_id(&conn, &kept.id).unwrap().unwrap();
    assert_eq!(kept.payment.status, PaymentState::Pending);
    assert!(kept.payment.failure_reason.is_none());
}

#[test]
fn test_history_shows_only_completed() {
    let conn = setup_test_db();
    let (user, _) = create_test_user(&conn, "payer@example.com");

    let completed = create_pending_optimization(&conn, &user.id);
    assert!(queries::complete_optimization_payment(&conn, &user.id, "pi_1").unwrap());

    // A second record left pending and a third marked failed
    create_pending_optimization(&conn, &user.id);
    assert!(queries::fail_optimization_payment(&conn, &user.id, "pi_2", "card declined").unwrap());
    create_pending_optimization(&conn, &user.id);

    let items = queries::list_completed_optimizations(&conn, &user.id, 10, 0).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, completed.id);
    assert_eq!(queries::count_completed_optimizations(&conn, &user.id).unwrap(), 1);
    assert_eq!(queries::count_optimizations_for_user(&conn, &user.id).unwrap(), 3);
}

#[test]
fn test_history_entry_is_owner_scoped() {
    let conn = setup_test_db();
    let (owner, _) = create_test_user(&conn, "owner@example.com");
    let (other, _) = create_test_user(&conn, "other@example.com");

    let record = create_pending_optimization(&conn, &owner.id);
    assert!(queries::complete_optimization_payment(&conn, &owner.id, "pi_1").unwrap());

    assert!(queries::get_completed_optimization(&conn, &record.id, &owner.id).unwrap().is_some());
    assert!(queries::get_completed_optimization(&conn, &record.id, &other.id).unwrap().is_none());
}

#[test]
fn test_history_pagination() {
    let conn = setup_test_db();
    let (user, _) = create_test_user(&conn, "payer@example.com");

    for _ in 0..3 {
        create_pending_optimization(&conn, &user.id);
        assert!(queries::complete_optimization_payment(&conn, &user.id, "pi_1").unwrap());
    }

    let page = queries::list_completed_optimizations(&conn, &user.id, 2, 0).unwrap();
    assert_eq!(page.len(), 2);
    let rest = queries::list_completed_optimizations(&conn, &user.id, 2, 2).unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(queries::count_completed_optimizations(&conn, &user.id).unwrap(), 3);
}
