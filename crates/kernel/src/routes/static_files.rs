//! Static asset serving.
//!
//! Files are looked up in the assets directory first; the built-in
//! stylesheet and script are served when no file overrides them.

use std::path::Path as FsPath;

use axum::{
    Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tokio::fs;
use tracing::warn;

use crate::render::{DEFAULT_SCRIPT, DEFAULT_STYLESHEET, SCRIPT_FILE, STYLESHEET_FILE};
use crate::state::AppState;

/// Create the static files router.
pub fn router() -> Router<AppState> {
    Router::new().route("/assets/{*path}", get(serve_asset))
}

/// Serve an asset.
async fn serve_asset(State(state): State<AppState>, Path(path): Path<String>) -> Response {
    // Security: prevent path traversal
    let path = path.trim_start_matches('/');
    if path.is_empty() || path.contains("..") || path.contains('\0') || path.contains('\\') {
        return not_found();
    }

    let file_path = state.assets_dir().join(path);
    let content_type = mime_from_path(&file_path);

    match fs::read(&file_path).await {
        Ok(content) => asset_response(content_type, content),
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %file_path.display(), error = %e, "failed to read asset");
            }
            match path {
                STYLESHEET_FILE => asset_response(content_type, DEFAULT_STYLESHEET),
                SCRIPT_FILE => asset_response(content_type, DEFAULT_SCRIPT),
                _ => not_found(),
            }
        }
    }
}

fn asset_response(content_type: &'static str, body: impl IntoResponse) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, "public, max-age=86400"),
        ],
        body,
    )
        .into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not found").into_response()
}

fn mime_from_path(path: &FsPath) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("js") => "application/javascript",
        Some("css") => "text/css",
        Some("html") => "text/html",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}
