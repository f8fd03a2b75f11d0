mod stripe;

pub use stripe::handle_stripe_webhook;

use axum::routing::post;
use axum::Router;

use crate::db::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/payment/webhook", post(handle_stripe_webhook))
}
