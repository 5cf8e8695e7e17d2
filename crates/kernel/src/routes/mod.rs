//! HTTP route handlers.

pub mod health;
pub mod search;
pub mod static_files;

use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// The complete application router.
///
/// `request_timeout` bounds each request end to end; the search pass has its
/// own, shorter deadline inside [`FacetService`](crate::facets::FacetService).
pub fn app(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .merge(search::router())
        .merge(health::router())
        .merge(static_files::router())
        // Middleware layers (last added = first executed in request flow):
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
