//! HTTP handlers for the session memory API
//!
//! - GET /api/v1/memory/recent?category=angles|hooks&limit=N

use crate::memory::session::{Category, MemoryEntry, SessionMemory};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

/// Shared state for memory handlers
#[derive(Clone)]
pub struct MemoryState {
    pub memory: Arc<SessionMemory>,
}

/// Create the memory router
pub fn memory_router(state: MemoryState) -> Router {
    Router::new()
        .route("/api/v1/memory/recent", get(recent))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub category: String,
    pub limit: Option<usize>,
}

async fn recent(
    State(state): State<MemoryState>,
    Query(query): Query<RecentQuery>,
) -> impl IntoResponse {
    let category: Category = match query.category.parse() {
        Ok(c) => c,
        Err(msg) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": {"code": "BAD_CATEGORY", "message": msg}})),
            )
                .into_response();
        }
    };

    let limit = query.limit.unwrap_or(5);
    let entries: Vec<MemoryEntry> = state.memory.recent(category, limit).await;
    Json(entries).into_response()
}
