//! COBS page fixtures and a local page server.

use std::time::Duration;

use axum::{
    http::{header, StatusCode},
    routing::get,
    Router,
};
use tokio::net::TcpListener;

/// Excerpt shaped like the COBS recent-observations listing
pub const PAGE_WITH_READING: &str = r#"<html><body>
<h2>Recent observations</h2>
<pre>
C/2023 A3 (Tsuchinshan-ATLAS)   2025 10 11.12, 13.4, 25L, ABC
3I/ATLAS                        2025 10 12.34, 10.5, 20L, XYZ
3I/ATLAS                        2025 10 11.90, 10.8, 30R, QRS
</pre>
</body></html>"#;

/// Same listing with the canonical 9.9 reading further down
pub const PAGE_WITH_CANONICAL_READING: &str = r#"<html><body><pre>
3I/ATLAS                        2025 10 12.34, 10.5, 20L, XYZ
3I/ATLAS                        2025 10 12.10, 9.9, 25L, ABC
</pre></body></html>"#;

pub const PAGE_WITHOUT_TARGET: &str = r#"<html><body><pre>
C/2023 A3 (Tsuchinshan-ATLAS)   2025 10 11.12, 13.4, 25L, ABC
</pre></body></html>"#;

/// Serve `router` on an ephemeral localhost port and return its base URL
pub async fn spawn_router(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fixture server");
    let addr = listener.local_addr().expect("Fixture server has no address");

    tokio::spawn(async move {
        let _ = axum::serve(
            listener,
            router.into_make_service_with_connect_info::<std::net::SocketAddr>(),
        )
        .await;
    });

    format!("http://{}", addr)
}

/// Fixture server answering `/recent/` with `page`
pub async fn spawn_page_server(page: &'static str) -> String {
    let base = spawn_router(Router::new().route("/recent/", get(move || async move { page }))).await;
    format!("{}/recent/", base)
}

/// Fixture server answering `/recent/` with a body that is not valid UTF-8
pub async fn spawn_invalid_utf8_server() -> String {
    let mut body = b"3I/ATLAS                        2025 10 12.34, 10.5, 20L ".to_vec();
    body.extend_from_slice(&[0xff, 0xfe]);

    let base = spawn_router(Router::new().route(
        "/recent/",
        get(move || {
            let body = body.clone();
            async move { ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], body) }
        }),
    ))
    .await;
    format!("{}/recent/", base)
}

/// Fixture server answering `/recent/` with `status`
pub async fn spawn_status_server(status: StatusCode) -> String {
    let base = spawn_router(Router::new().route(
        "/recent/",
        get(move || async move { (status, "unavailable") }),
    ))
    .await;
    format!("{}/recent/", base)
}

/// Fixture server that answers only after `delay`
pub async fn spawn_slow_server(delay: Duration) -> String {
    let base = spawn_router(Router::new().route(
        "/recent/",
        get(move || async move {
            tokio::time::sleep(delay).await;
            PAGE_WITH_READING
        }),
    ))
    .await;
    format!("{}/recent/", base)
}

/// URL of a localhost port nothing listens on
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to reserve port");
    let addr = listener.local_addr().expect("Reserved port has no address");
    drop(listener);

    format!("http://{}/recent/", addr)
}
