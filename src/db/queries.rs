//! Database operations for users, sessions, and optimization records.

use chrono::Utc;
use rusqlite::{params, Connection};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use super::from_row::{query_all, query_one, OPTIMIZATION_COLS, USER_COLS};
use crate::error::{AppError, Result};
use crate::id::EntityType;
use crate::models::{CreateOptimization, CreateUser, Optimization, PaymentRecord, PaymentState, User};

fn now() -> i64 {
    Utc::now().timestamp()
}

/// SHA-256 hex digest, used for session tokens and salted passwords.
/// Raw secrets are never stored.
fn hash_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

// ============ Users ============

fn gen_salt() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 16];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn hash_password(salt: &str, password: &str) -> String {
    hash_secret(&format!("{}{}", salt, password))
}

/// Create a user. Fails with Conflict if the email is already registered.
pub fn create_user(conn: &Connection, input: &CreateUser) -> Result<User> {
    let id = EntityType::User.gen_id();
    let now = now();
    let email = input.email.trim().to_lowercase();

    if get_user_by_email(conn, &email)?.is_some() {
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let salt = gen_salt();
    let hash = hash_password(&salt, &input.password);

    conn.execute(
        "INSERT INTO users (id, email, name, password_salt, password_hash, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![&id, &email, &input.name, &salt, &hash, now, now],
    )?;

    Ok(User {
        id,
        email,
        name: input.name.clone(),
        password_salt: salt,
        password_hash: hash,
        created_at: now,
        updated_at: now,
    })
}

pub fn get_user_by_id(conn: &Connection, id: &str) -> Result<Option<User>> {
    query_one(
        conn,
        &format!("SELECT {} FROM users WHERE id = ?1", USER_COLS),
        &[&id],
    )
}

pub fn get_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>> {
    let email = email.trim().to_lowercase();
    query_one(
        conn,
        &format!("SELECT {} FROM users WHERE email = ?1", USER_COLS),
        &[&email],
    )
}

/// Constant-time password check against the stored salted hash.
pub fn verify_password(user: &User, password: &str) -> bool {
    let candidate = hash_password(&user.password_salt, password);
    candidate
        .as_bytes()
        .ct_eq(user.password_hash.as_bytes())
        .into()
}

// ============ Sessions ============

/// Session lifetime: 30 days.
const SESSION_TTL_SECS: i64 = 30 * 24 * 3600;

/// Generate an opaque session token with sc_sess_ prefix.
pub fn generate_session_token() -> String {
    format!("sc_sess_{}", Uuid::new_v4().as_simple())
}

/// Create a session for a user. Returns the raw token; only its hash is stored.
pub fn create_session(conn: &Connection, user_id: &str) -> Result<String> {
    let id = EntityType::Session.gen_id();
    let token = generate_session_token();
    let now = now();

    conn.execute(
        "INSERT INTO sessions (id, user_id, token_hash, created_at, expires_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![&id, user_id, &hash_secret(&token), now, now + SESSION_TTL_SECS],
    )?;

    Ok(token)
}

/// Look up the user owning a session token, if the session is still valid.
pub fn get_user_by_session_token(conn: &Connection, token: &str) -> Result<Option<User>> {
    query_one(
        conn,
        "SELECT u.id, u.email, u.name, u.password_salt, u.password_hash, u.created_at, u.updated_at
         FROM users u
         JOIN sessions s ON s.user_id = u.id
         WHERE s.token_hash = ?1 AND s.expires_at > ?2",
        &[&hash_secret(token), &now()],
    )
}

/// Delete a session by its raw token. Returns whether a session was removed.
pub fn delete_session(conn: &Connection, token: &str) -> Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM sessions WHERE token_hash = ?1",
        params![&hash_secret(token)],
    )?;
    Ok(deleted > 0)
}

// ============ Optimizations ============

/// Create a durable optimization record with payment status `pending`.
///
/// Called only for authenticated users once a payment authorization has
/// been accepted client-side. Guests never reach this path.
pub fn create_optimization(
    conn: &Connection,
    user_id: &str,
    input: &CreateOptimization,
) -> Result<Optimization> {
    let id = EntityType::Optimization.gen_id();
    let now = now();
    let titles = serde_json::to_string(&input.suggestions.titles)?;
    let keywords = serde_json::to_string(&input.suggestions.keywords)?;

    conn.execute(
        "INSERT INTO optimizations (
            id, user_id, original_content, optimized_content, word_count, price_cents,
            titles, keywords, meta_description,
            payment_status, payment_amount_cents, payment_currency, payment_intent_id,
            created_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            &id,
            user_id,
            &input.original_content,
            &input.optimized_content,
            input.word_count,
            input.price_cents,
            &titles,
            &keywords,
            &input.suggestions.meta_description,
            PaymentState::Pending.as_str(),
            input.price_cents,
            "usd",
            &input.payment_intent_id,
            now,
        ],
    )?;

    Ok(Optimization {
        id,
        user_id: user_id.to_string(),
        original_content: input.original_content.clone(),
        optimized_content: input.optimized_content.clone(),
        word_count: input.word_count,
        price_cents: input.price_cents,
        suggestions: input.suggestions.clone(),
        payment: PaymentRecord {
            status: PaymentState::Pending,
            amount_cents: input.price_cents,
            currency: "usd".to_string(),
            payment_intent_id: input.payment_intent_id.clone(),
            completed_at: None,
            failure_reason: None,
        },
        created_at: now,
    })
}

/// Conditionally transition the pending record for a payment authorization
/// to `completed`.
///
/// The record is located by its accepted intent id, falling back to the
/// user's newest pending record saved before the id was known. The
/// precondition check and the field update are a single UPDATE over at most
/// one row, so webhook redelivery, or a stale `failed` arriving after
/// `succeeded`, is a harmless no-op, and a user with several pending drafts
/// only ever unlocks the one that was paid for. Returns whether a record
/// was transitioned.
pub fn complete_optimization_payment(
    conn: &Connection,
    user_id: &str,
    payment_intent_id: &str,
) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE optimizations
         SET payment_status = 'completed', payment_completed_at = ?1, payment_intent_id = ?2
         WHERE id = (
             SELECT id FROM optimizations
             WHERE user_id = ?3 AND payment_status = 'pending'
               AND (payment_intent_id = ?2 OR payment_intent_id IS NULL)
             ORDER BY payment_intent_id IS NULL, created_at DESC
             LIMIT 1
         )",
        params![now(), payment_intent_id, user_id],
    )?;
    Ok(affected > 0)
}

/// Conditionally transition the pending record for a payment authorization
/// to `failed`.
///
/// Same single-row conditional shape as `complete_optimization_payment`; a
/// record that already completed is never downgraded.
pub fn fail_optimization_payment(
    conn: &Connection,
    user_id: &str,
    payment_intent_id: &str,
    failure_reason: &str,
) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE optimizations
         SET payment_status = 'failed', payment_failure_reason = ?1, payment_intent_id = ?2
         WHERE id = (
             SELECT id FROM optimizations
             WHERE user_id = ?3 AND payment_status = 'pending'
               AND (payment_intent_id = ?2 OR payment_intent_id IS NULL)
             ORDER BY payment_intent_id IS NULL, created_at DESC
             LIMIT 1
         )",
        params![failure_reason, payment_intent_id, user_id],
    )?;
    Ok(affected > 0)
}

/// List a user's completed optimizations, newest first.
///
/// Only `completed` records are ever surfaced; pending and failed ones are
/// invisible to the history read path.
pub fn list_completed_optimizations(
    conn: &Connection,
    user_id: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<Optimization>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM optimizations
             WHERE user_id = ?1 AND payment_status = 'completed'
             ORDER BY created_at DESC
             LIMIT ?2 OFFSET ?3",
            OPTIMIZATION_COLS
        ),
        &[&user_id, &limit, &offset],
    )
}

pub fn count_completed_optimizations(conn: &Connection, user_id: &str) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM optimizations WHERE user_id = ?1 AND payment_status = 'completed'",
        params![user_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Fetch a single completed optimization, scoped to its owner.
pub fn get_completed_optimization(
    conn: &Connection,
    id: &str,
    user_id: &str,
) -> Result<Option<Optimization>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM optimizations
             WHERE id = ?1 AND user_id = ?2 AND payment_status = 'completed'",
            OPTIMIZATION_COLS
        ),
        &[&id, &user_id],
    )
}

/// Fetch a record regardless of payment status (internal/test use).
pub fn get_optimization_by_id(conn: &Connection, id: &str) -> Result<Option<Optimization>> {
    query_one(
        conn,
        &format!("SELECT {} FROM optimizations WHERE id = ?1", OPTIMIZATION_COLS),
        &[&id],
    )
}

/// Count all records owned by a user, regardless of payment status.
pub fn count_optimizations_for_user(conn: &Connection, user_id: &str) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM optimizations WHERE user_id = ?1",
        params![user_id],
        |row| row.get(0),
    )?;
    Ok(count)
}
