//! Optimization history, authenticated users only.
//!
//! Only records whose payment completed are visible here; pending and
//! failed records never appear.

use axum::extract::State;
use axum::http::HeaderMap;

use crate::db::{queries, AppState};
use crate::error::{AppError, Result};
use crate::extractors::{session_user, Json, Path, Query};
use crate::id::is_valid_prefixed_id;
use crate::models::Optimization;
use crate::pagination::{Paginated, PaginationQuery};

/// GET /api/optimize/history
pub async fn list_history(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<Paginated<Optimization>>> {
    let conn = state.db.get()?;
    let user = session_user(&conn, &headers)?;

    let limit = pagination.limit();
    let offset = pagination.offset();

    let items = queries::list_completed_optimizations(&conn, &user.id, limit, offset)?;
    let total = queries::count_completed_optimizations(&conn, &user.id)?;

    Ok(Json(Paginated::new(items, total, limit, offset)))
}

/// GET /api/optimize/history/{id}
pub async fn get_history_entry(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Optimization>> {
    if !is_valid_prefixed_id(&id) {
        return Err(AppError::NotFound("Optimization not found".into()));
    }

    let conn = state.db.get()?;
    let user = session_user(&conn, &headers)?;

    let record = queries::get_completed_optimization(&conn, &id, &user.id)?
        .ok_or_else(|| AppError::NotFound("Optimization not found".into()))?;

    Ok(Json(record))
}
