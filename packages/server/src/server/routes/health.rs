use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domains::observations::{ObservationSource, RefreshState};
use crate::server::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    refresh: RefreshState,
    source: ObservationSource,
    updated: DateTime<Utc>,
}

/// Health check endpoint
///
/// Reports whether a refresh cycle is in flight and the provenance and age of
/// the cached reading. The process serving the request is the only thing
/// checked, so the status is always `healthy`.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let cache = state.cache().snapshot().await;

    Json(HealthResponse {
        status: "healthy".to_string(),
        refresh: state.refresher.state(),
        source: cache.source,
        updated: cache.updated,
    })
}
