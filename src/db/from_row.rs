//! Row mapping trait and helpers for reducing boilerplate in queries.

use rusqlite::{Connection, OptionalExtension, Row, ToSql};

use crate::models::*;

/// Parse a string column into an enum type, converting parse errors to
/// rusqlite errors instead of panicking on corrupted data.
fn parse_enum<T: std::str::FromStr>(row: &Row, col: usize, col_name: &str) -> rusqlite::Result<T> {
    row.get::<_, String>(col)?.parse::<T>().map_err(|_| {
        rusqlite::Error::InvalidColumnType(col, col_name.to_string(), rusqlite::types::Type::Text)
    })
}

/// Parse a TEXT column holding a JSON string array.
fn parse_json_vec(row: &Row, col: usize, col_name: &str) -> rusqlite::Result<Vec<String>> {
    let raw: String = row.get(col)?;
    serde_json::from_str(&raw).map_err(|_| {
        rusqlite::Error::InvalidColumnType(col, col_name.to_string(), rusqlite::types::Type::Text)
    })
}

/// Trait for constructing a type from a database row.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Query for a single optional result.
pub fn query_one<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Option<T>> {
    conn.query_row(sql, params, T::from_row)
        .optional()
        .map_err(Into::into)
}

/// Query for multiple results.
pub fn query_all<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, T::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ============ SQL SELECT Constants ============

pub const USER_COLS: &str =
    "id, email, name, password_salt, password_hash, created_at, updated_at";

pub const OPTIMIZATION_COLS: &str = "id, user_id, original_content, optimized_content, word_count, price_cents, titles, keywords, meta_description, payment_status, payment_amount_cents, payment_currency, payment_intent_id, payment_completed_at, payment_failure_reason, created_at";

impl FromRow for User {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(User {
            id: row.get(0)?,
            email: row.get(1)?,
            name: row.get(2)?,
            password_salt: row.get(3)?,
            password_hash: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }
}

impl FromRow for Optimization {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Optimization {
            id: row.get(0)?,
            user_id: row.get(1)?,
            original_content: row.get(2)?,
            optimized_content: row.get(3)?,
            word_count: row.get(4)?,
            price_cents: row.get(5)?,
            suggestions: Suggestions {
                titles: parse_json_vec(row, 6, "titles")?,
                keywords: parse_json_vec(row, 7, "keywords")?,
                meta_description: row.get(8)?,
            },
            payment: PaymentRecord {
                status: parse_enum(row, 9, "payment_status")?,
                amount_cents: row.get(10)?,
                currency: row.get(11)?,
                payment_intent_id: row.get(12)?,
                completed_at: row.get(13)?,
                failure_reason: row.get(14)?,
            },
            created_at: row.get(15)?,
        })
    }
}
