//! Test utilities and fixtures for Smartaicopy integration tests

#![allow(dead_code)]

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

pub use smartaicopy::db::{init_db, queries, AppState};
pub use smartaicopy::error::Result;
pub use smartaicopy::flow::PaymentGateway;
pub use smartaicopy::models::*;
pub use smartaicopy::payments::{IntentTag, PaymentIntent, PaymentIntentStatus, StripeClient};
pub use smartaicopy::rewrite::OpenAiClient;

use async_trait::async_trait;
use std::sync::Mutex;

pub const TEST_WEBHOOK_SECRET: &str = "whsec_test_secret";

/// Create an in-memory test database with schema initialized
pub fn setup_test_db() -> Connection {
    let conn = Connection::open_in_memory().expect("Failed to create in-memory database");
    init_db(&conn).expect("Failed to initialize schema");
    conn
}

/// Create an AppState for testing with an in-memory database
pub fn create_test_app_state() -> AppState {
    let manager = SqliteConnectionManager::memory();
    let pool = Pool::builder().max_size(1).build(manager).unwrap();
    {
        let conn = pool.get().unwrap();
        init_db(&conn).unwrap();
    }

    AppState {
        db: pool,
        stripe: StripeClient::new("sk_test_xxx", TEST_WEBHOOK_SECRET),
        rewriter: OpenAiClient::new("test-key", "gpt-4o-mini"),
        base_url: "http://localhost:3000".to_string(),
    }
}

/// Create a test user and an active session token for it
pub fn create_test_user(conn: &Connection, email: &str) -> (User, String) {
    let input = CreateUser {
        email: email.to_string(),
        name: format!("Test User {}", email),
        password: "test-password-123".to_string(),
    };
    let user = queries::create_user(conn, &input).expect("Failed to create test user");
    let token = queries::create_session(conn, &user.id).expect("Failed to create test session");
    (user, token)
}

/// A preview draft for a short (standard tier) submission
pub fn sample_draft() -> OptimizationDraft {
    OptimizationDraft {
        original_content: "some plain words about a topic".to_string(),
        optimized_content: "sharper words about the same topic".to_string(),
        word_count: 6,
        price_cents: 2500,
        suggestions: Suggestions {
            titles: vec!["Title One".to_string(), "Title Two".to_string()],
            keywords: vec!["topic".to_string(), "words".to_string()],
            meta_description: "A short piece about a topic.".to_string(),
        },
    }
}

/// Create a pending optimization record for a user
pub fn create_pending_optimization(conn: &Connection, user_id: &str) -> Optimization {
    create_pending_with_intent(conn, user_id, None)
}

/// Create a pending optimization record tied to a payment authorization
pub fn create_pending_with_intent(
    conn: &Connection,
    user_id: &str,
    payment_intent_id: Option<&str>,
) -> Optimization {
    let draft = sample_draft();
    let input = CreateOptimization {
        original_content: draft.original_content,
        optimized_content: draft.optimized_content,
        word_count: draft.word_count,
        price_cents: draft.price_cents,
        suggestions: draft.suggestions,
        payment_intent_id: payment_intent_id.map(|s| s.to_string()),
    };
    queries::create_optimization(conn, user_id, &input).expect("Failed to create test record")
}

/// Get the current timestamp in milliseconds
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Payment gateway fake with scripted responses
pub struct FakeGateway {
    pub status: PaymentIntentStatus,
    pub fail_create: bool,
    pub created: Mutex<Vec<(i64, IntentTag)>>,
}

impl FakeGateway {
    pub fn succeeding() -> Self {
        Self::with_status(PaymentIntentStatus::Succeeded)
    }

    pub fn with_status(status: PaymentIntentStatus) -> Self {
        Self {
            status,
            fail_create: false,
            created: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_intent(
        &self,
        amount_cents: i64,
        _currency: &str,
        tag: &IntentTag,
    ) -> Result<PaymentIntent> {
        if self.fail_create {
            return Err(smartaicopy::error::AppError::Upstream(
                "gateway unavailable".to_string(),
            ));
        }
        self.created.lock().unwrap().push((amount_cents, tag.clone()));
        Ok(PaymentIntent {
            id: "pi_test_123".to_string(),
            client_secret: "pi_test_123_secret_abc".to_string(),
        })
    }

    async fn retrieve_status(&self, _client_secret: &str) -> Result<PaymentIntentStatus> {
        Ok(self.status.clone())
    }
}
