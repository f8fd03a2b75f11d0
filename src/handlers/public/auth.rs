//! Account endpoints backing the auth gate.
//!
//! Deliberately minimal: enough for the optimize flow to hand a browser to
//! a signup/login page and get a session back. Password reset, email
//! verification, and the like live elsewhere.

use axum::extract::State;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::db::{queries, AppState};
use crate::error::{AppError, Result};
use crate::extractors::{bearer_token, session_user_opt, Json};
use crate::models::CreateUser;

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user_id: String,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionCheck {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<CreateUser>,
) -> Result<Json<AuthResponse>> {
    if req.email.trim().is_empty() || !req.email.contains('@') {
        return Err(AppError::BadRequest("Valid email is required".into()));
    }
    if req.password.len() < 8 {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".into(),
        ));
    }

    let conn = state.db.get()?;
    let user = queries::create_user(&conn, &req)?;
    let token = queries::create_session(&conn, &user.id)?;

    tracing::info!(user_id = %user.id, "user registered");

    Ok(Json(AuthResponse {
        token,
        user_id: user.id,
        email: user.email,
        name: user.name,
    }))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let conn = state.db.get()?;

    let user = queries::get_user_by_email(&conn, &req.email)?.ok_or(AppError::Unauthorized)?;
    if !queries::verify_password(&user, &req.password) {
        return Err(AppError::Unauthorized);
    }

    let token = queries::create_session(&conn, &user.id)?;

    Ok(Json(AuthResponse {
        token,
        user_id: user.id,
        email: user.email,
        name: user.name,
    }))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<LogoutResponse>> {
    let conn = state.db.get()?;
    let success = match bearer_token(&headers) {
        Some(token) => queries::delete_session(&conn, token)?,
        None => false,
    };
    Ok(Json(LogoutResponse { success }))
}

/// GET /api/auth/check
pub async fn check_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionCheck>> {
    let conn = state.db.get()?;
    let user = session_user_opt(&conn, &headers)?;
    Ok(Json(SessionCheck {
        authenticated: user.is_some(),
        email: user.map(|u| u.email),
    }))
}
