use std::io;
use std::path::{Component, Path};

use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
};

use crate::server::app::AppState;

/// Serve a file from the static root, `/` mapping to `index.html`
pub async fn serve_static(State(state): State<AppState>, uri: Uri) -> Response {
    serve_file(&state.static_root, uri.path()).await
}

/// Resolve `request_path` under `root` and return its bytes
///
/// Missing files, directories and paths escaping the root are all `404`;
/// a file that exists but cannot be read is `500`.
pub async fn serve_file(root: &Path, request_path: &str) -> Response {
    let relative = if request_path == "/" {
        "index.html"
    } else {
        request_path.trim_start_matches('/')
    };

    if relative.is_empty() || escapes_root(relative) {
        return not_found();
    }

    let file_path = root.join(relative);
    match tokio::fs::metadata(&file_path).await {
        Ok(meta) if meta.is_file() => {}
        _ => return not_found(),
    }

    let read = tokio::fs::read(&file_path).await;
    file_response(&file_path, read)
}

/// Response for the outcome of reading a resolved static file
fn file_response(file_path: &Path, read: io::Result<Vec<u8>>) -> Response {
    match read {
        Ok(content) => (
            [(header::CONTENT_TYPE, content_type_for(&file_path.to_string_lossy()))],
            content,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(path = %file_path.display(), error = %e, "Failed to read static file");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

/// Content type by file extension
pub fn content_type_for(path: &str) -> &'static str {
    if path.ends_with(".html") {
        "text/html"
    } else if path.ends_with(".js") {
        "application/javascript"
    } else if path.ends_with(".css") {
        "text/css"
    } else {
        "application/octet-stream"
    }
}

fn escapes_root(relative: &str) -> bool {
    Path::new(relative).components().any(|component| {
        matches!(
            component,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}
