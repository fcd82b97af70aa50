//! Application setup and server configuration.

use std::any::Any;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    http::{Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

use crate::domains::observations::{CacheStore, Refresher};
use crate::server::middleware::security_headers;
use crate::server::routes::{cobs_handler, health_handler, latest_handler, test_handler};
use crate::server::static_files::serve_static;

/// Longest panic message echoed back in a 500 body
const PANIC_DETAIL_CHARS: usize = 100;

/// Requests per client IP the `/api/*` routes accept before answering 429
const API_BURST_PER_IP: u32 = 60;

/// One request slot is refilled per this many seconds (60 per minute)
const API_REPLENISH_SECS: u64 = 1;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub refresher: Arc<Refresher>,
    pub static_root: Arc<PathBuf>,
}

impl AppState {
    pub fn new(refresher: Arc<Refresher>, static_root: impl Into<PathBuf>) -> Self {
        Self {
            refresher,
            static_root: Arc::new(static_root.into()),
        }
    }

    pub fn cache(&self) -> &CacheStore {
        self.refresher.store()
    }
}

/// Build the Axum application router
///
/// API routes are matched first; every other GET falls through to the static
/// asset directory.
///
/// The rate limiter's buckets live inside the returned router, so clones of it
/// share one budget per client IP. The client IP comes from `X-Forwarded-For`
/// / `X-Real-IP` / `Forwarded`, else the peer address, which requires serving
/// with `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn build_app(state: AppState) -> Router {
    // CORS configuration - the API is public and read-only
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([Method::GET]);

    // Rate limiting: 60 requests per minute per IP on /api/*
    // /api/cobs hits COBS on every call, so the whole API shares the budget
    let rate_limit_config = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(API_REPLENISH_SECS)
            .burst_size(API_BURST_PER_IP)
            .use_headers()
            .finish()
            .expect("Rate limiter configuration is valid and should never fail"),
    );

    let rate_limit_layer = GovernorLayer {
        config: rate_limit_config,
    };

    let api = Router::new()
        .route("/api/latest", get(latest_handler))
        .route("/api/test", get(test_handler))
        .route("/api/cobs", get(cobs_handler))
        .layer(rate_limit_layer);

    Router::new()
        .merge(api)
        // Health check and static files (no rate limit)
        .route("/health", get(health_handler))
        .fallback(get(serve_static))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn(security_headers))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Turn a handler panic into a plain-text 500 instead of dropping the
/// connection.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown error".to_string()
    };

    tracing::error!(error = %detail, "Request handler panicked");

    let truncated: String = detail.chars().take(PANIC_DETAIL_CHARS).collect();
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Server Error: {}", truncated),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn exploding_handler() -> &'static str {
        panic!("cache exploded")
    }

    #[tokio::test]
    async fn test_panic_becomes_plain_text_500() {
        let app: Router = Router::new()
            .route("/boom", get(exploding_handler))
            .layer(CatchPanicLayer::custom(handle_panic));

        let response = app
            .oneshot(Request::get("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/plain"));
        assert_eq!(body_text(response).await, "Server Error: cache exploded");
    }

    #[tokio::test]
    async fn test_panic_detail_truncated() {
        let response = handle_panic(Box::new("x".repeat(500)));
        let body = body_text(response).await;

        assert_eq!(body.len(), "Server Error: ".len() + PANIC_DETAIL_CHARS);
    }
}
