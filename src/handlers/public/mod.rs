mod auth;
mod history;
mod intent;
mod optimize;
mod save;

pub use auth::{check_session, login, logout, signup, AuthResponse, LoginRequest, SessionCheck};
pub use history::{get_history_entry, list_history};
pub use intent::{create_payment_intent, IntentRequest, IntentResponse};
pub use optimize::{optimize_content, validate_submission, OptimizeRequest, OptimizeResponse};
pub use save::{save_optimization, SaveResponse};

use axum::routing::{get, post};
use axum::Router;

use crate::db::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/optimize", post(optimize_content))
        .route("/api/optimize/save", post(save_optimization))
        .route("/api/optimize/history", get(list_history))
        .route("/api/optimize/history/{id}", get(get_history_entry))
        .route("/api/payment/intent", post(create_payment_intent))
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/check", get(check_session))
}
