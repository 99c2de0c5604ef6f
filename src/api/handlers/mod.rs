use std::collections::BTreeSet;
use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use super::AppState;
use crate::mcp::render_roadmap;
use crate::models::*;
use crate::search::{DateRange, SearchFilters, SearchResult};
use crate::store::{Action, AgentState};

// ============================================================
// Error Handling
// ============================================================

/// Log an internal error and return a sanitized response to the client.
/// The full error is logged server-side; clients only see a generic message.
fn internal_error(e: impl std::fmt::Display) -> (StatusCode, String) {
    tracing::error!("Internal error: {:#}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

/// Validation failures are safe to show to the client as-is.
fn bad_request(msg: impl std::fmt::Display) -> (StatusCode, String) {
    let msg = msg.to_string();
    tracing::warn!("Validation error: {}", msg);
    (StatusCode::BAD_REQUEST, msg)
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Search
// ============================================================

/// Query parameters for roadmap search.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Free-text query. Missing or blank returns no results.
    #[serde(default)]
    pub q: String,
    pub status: Option<String>,
    pub priority: Option<String>,
    /// Comma-separated tag list.
    pub tags: Option<String>,
    /// Date range start (`YYYY-MM-DD`), requires `end`.
    pub start: Option<NaiveDate>,
    /// Date range end (`YYYY-MM-DD`), requires `start`.
    pub end: Option<NaiveDate>,
}

impl SearchQuery {
    fn filters(&self) -> Result<SearchFilters, String> {
        let status = self
            .status
            .as_deref()
            .map(Status::from_str)
            .transpose()
            .map_err(|e| e.to_string())?;
        let priority = self
            .priority
            .as_deref()
            .map(Priority::from_str)
            .transpose()
            .map_err(|e| e.to_string())?;
        let tags: BTreeSet<String> = self
            .tags
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        let date_range = match (self.start, self.end) {
            (None, None) => None,
            (Some(start), Some(end)) => Some(
                DateRange::new(start, end)
                    .ok_or_else(|| "Date range start must not be after end".to_string())?,
            ),
            _ => return Err("Date range needs both start and end".to_string()),
        };

        Ok(SearchFilters {
            status,
            priority,
            tags,
            date_range,
        })
    }
}

/// Rank modules, features and timeline events against the query.
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<SearchResult>>, (StatusCode, String)> {
    let filters = query.filters().map_err(bad_request)?;
    state
        .db
        .search(&query.q, &filters)
        .map(Json)
        .map_err(internal_error)
}

// ============================================================
// Modules
// ============================================================

pub async fn list_modules(
    State(state): State<AppState>,
) -> Result<Json<Vec<Module>>, (StatusCode, String)> {
    state.db.list_modules().map(Json).map_err(internal_error)
}

pub async fn get_module(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Module>, (StatusCode, String)> {
    state
        .db
        .get_module(&id)
        .map_err(internal_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Module not found".to_string()))
}

/// Modules and their features as an ASCII tree (text/plain).
pub async fn render_module_tree(
    State(state): State<AppState>,
) -> Result<String, (StatusCode, String)> {
    let modules = state.db.list_modules().map_err(internal_error)?;
    Ok(render_roadmap(&modules))
}

// ============================================================
// Timeline
// ============================================================

pub async fn list_timeline(
    State(state): State<AppState>,
) -> Result<Json<Vec<TimelineEvent>>, (StatusCode, String)> {
    state.db.list_timeline().map(Json).map_err(internal_error)
}

pub async fn get_timeline_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TimelineEvent>, (StatusCode, String)> {
    state
        .db
        .get_timeline_event(&id)
        .map_err(internal_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Timeline event not found".to_string()))
}

// ============================================================
// Dataset
// ============================================================

pub async fn export_dataset(
    State(state): State<AppState>,
) -> Result<Json<Dataset>, (StatusCode, String)> {
    state.db.load_dataset().map(Json).map_err(internal_error)
}

/// Replace the whole dataset. Invalid datasets are rejected before any write.
pub async fn import_dataset(
    State(state): State<AppState>,
    Json(dataset): Json<Dataset>,
) -> Result<StatusCode, (StatusCode, String)> {
    dataset.validate().map_err(bad_request)?;
    state
        .db
        .replace_dataset(&dataset)
        .map_err(internal_error)?;
    tracing::info!(
        "Imported dataset with {} records",
        dataset.record_count()
    );
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================
// Agent Store
// ============================================================

pub async fn get_store_state(State(state): State<AppState>) -> Json<AgentState> {
    Json(state.store.state())
}

pub async fn dispatch_action(
    State(state): State<AppState>,
    Json(action): Json<Action>,
) -> Json<AgentState> {
    Json(state.store.dispatch(action))
}
