use rusqlite::Connection;

/// Initialize the database schema.
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        -- Users (identity - record ownership)
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            password_salt TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);

        -- Sessions (opaque bearer tokens, stored hashed)
        CREATE TABLE IF NOT EXISTS sessions (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            token_hash TEXT NOT NULL UNIQUE,
            created_at INTEGER NOT NULL,
            expires_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_sessions_token ON sessions(token_hash);
        CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);

        -- Optimizations (durable paid-result records)
        -- payment_status transitions: pending -> completed | failed, terminal
        -- once non-pending. The transition is a conditional UPDATE so webhook
        -- redelivery is a no-op.
        CREATE TABLE IF NOT EXISTS optimizations (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            original_content TEXT NOT NULL,
            optimized_content TEXT NOT NULL,
            word_count INTEGER NOT NULL,
            price_cents INTEGER NOT NULL,
            titles TEXT NOT NULL,            -- JSON array
            keywords TEXT NOT NULL,          -- JSON array
            meta_description TEXT NOT NULL,
            payment_status TEXT NOT NULL CHECK (payment_status IN ('pending', 'completed', 'failed')),
            payment_amount_cents INTEGER NOT NULL,
            payment_currency TEXT NOT NULL,
            payment_intent_id TEXT,
            payment_completed_at INTEGER,
            payment_failure_reason TEXT,
            created_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_optimizations_user ON optimizations(user_id, created_at DESC);
        CREATE INDEX IF NOT EXISTS idx_optimizations_pending ON optimizations(user_id) WHERE payment_status = 'pending';
        "#,
    )
}
