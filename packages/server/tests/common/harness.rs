//! Test harness for driving the HTTP router without a socket.
//!
//! Each harness owns a temporary static root and a refresher wired to a
//! `MockMagnitudeSource`, so tests control exactly what the refresh cycle sees.
//! The router is built once per harness, so the per-IP rate limit budget
//! carries across requests the way it does on a live server.

use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::body::{to_bytes, Body};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use tempfile::TempDir;
use test_context::AsyncTestContext;
use tower::ServiceExt;
use tracker_core::domains::observations::{CacheStore, ObservationCache, RefreshOutcome, Refresher};
use tracker_core::kernel::MockMagnitudeSource;
use tracker_core::server::{build_app, AppState};

/// Response captured from a oneshot request
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("response body is not JSON")
    }
}

/// Client address sent with requests that don't name their own
pub const DEFAULT_CLIENT_IP: &str = "203.0.113.7";

pub struct TestHarness {
    pub state: AppState,
    app: Router,
    pub source_calls: Arc<Mutex<usize>>,
    // Keeps the static root alive for the harness lifetime
    static_dir: TempDir,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::with_source(MockMagnitudeSource::new().with_reading(10.5))
    }

    async fn teardown(self) {
        // Temporary static root is removed on drop
    }
}

impl TestHarness {
    /// Harness whose refresher reads from `source`
    pub fn with_source(source: MockMagnitudeSource) -> Self {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let static_dir = TempDir::new().expect("Failed to create static root");
        let source_calls = source.call_counter();
        let refresher = Arc::new(Refresher::new(Arc::new(source), CacheStore::new()));

        let state = AppState::new(refresher, static_dir.path());

        Self {
            app: build_app(state.clone()),
            state,
            source_calls,
            static_dir,
        }
    }

    pub fn static_root(&self) -> &Path {
        self.static_dir.path()
    }

    /// Write a file under the static root, creating parent directories
    pub fn write_static(&self, relative: &str, contents: &str) {
        let path = self.static_root().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create static dir");
        }
        std::fs::write(path, contents).expect("Failed to write static file");
    }

    /// Run one refresh cycle against the mock source
    pub async fn refresh(&self) -> RefreshOutcome {
        self.state.refresher.run_cycle().await
    }

    pub async fn cache(&self) -> ObservationCache {
        self.state.cache().snapshot().await
    }

    pub fn source_calls(&self) -> usize {
        *self.source_calls.lock().unwrap()
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, &[]).await
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        if !headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case("x-forwarded-for"))
        {
            builder = builder.header("x-forwarded-for", DEFAULT_CLIENT_IP);
        }
        let request = builder.body(Body::empty()).expect("Failed to build request");

        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}
