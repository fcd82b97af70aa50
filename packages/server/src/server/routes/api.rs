//! JSON API consumed by the tracker front-end.
//!
//! GET /api/latest - cached observation
//! GET /api/test   - liveness check with server time
//! GET /api/cobs   - on-demand COBS fetch, bypassing the cache

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::domains::observations::ObservationCache;
use crate::kernel::BaseMagnitudeSource;
use crate::server::app::AppState;

/// Name reported by `/api/test`
pub const SERVER_NAME: &str = "3I-ATLAS-Tracker";

#[derive(Serialize)]
pub struct LatestResponse {
    ok: bool,
    cache: ObservationCache,
}

#[derive(Serialize)]
pub struct TestResponse {
    ok: bool,
    server: &'static str,
    timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CobsResponse {
    ok: bool,
    url: String,
    latest_mag: Option<f64>,
}

pub async fn latest_handler(State(state): State<AppState>) -> Json<LatestResponse> {
    let cache = state.cache().snapshot().await;
    debug!(magnitude = cache.latest_mag, source = %cache.source, "Serving latest observation");

    Json(LatestResponse { ok: true, cache })
}

pub async fn test_handler() -> Json<TestResponse> {
    Json(TestResponse {
        ok: true,
        server: SERVER_NAME,
        timestamp: Utc::now(),
    })
}

/// Diagnostic fetch; the result is reported but never written to the cache
pub async fn cobs_handler(State(state): State<AppState>) -> Json<CobsResponse> {
    let source = state.refresher.source();
    let latest_mag = source.fetch_latest().await;
    info!(magnitude = ?latest_mag, "Diagnostic COBS fetch");

    Json(CobsResponse {
        ok: true,
        url: source.source_url().to_string(),
        latest_mag,
    })
}
