mod from_row;
mod schema;
pub mod queries;

pub use from_row::{query_all, query_one, FromRow, OPTIMIZATION_COLS, USER_COLS};
pub use schema::init_db;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::payments::StripeClient;
use crate::rewrite::OpenAiClient;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Application state holding the database pool, provider clients, and
/// configuration shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub stripe: StripeClient,
    pub rewriter: OpenAiClient,
    /// Base URL for redirect targets (e.g. https://smartaicopy.example.com)
    pub base_url: String,
}

pub fn create_pool(database_path: &str) -> Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::file(database_path);
    Pool::builder().max_size(10).build(manager)
}
