use super::handlers;
use super::state::AppState;
use axum::{routing::get, Router};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// API paths, as reported by `/routes-debug`
pub const API_ROUTES: &[&str] = &[
    "/routes-debug",
    "/",
    "/download",
    "/download/instagram",
    "/info",
];

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.downloads.base_dir);

    Router::new()
        .route("/routes-debug", get(handlers::routes_debug))
        .route("/", get(handlers::root))
        // Downloads
        .route("/download", get(handlers::download))
        .route("/download/instagram", get(handlers::download_social))
        // Metadata
        .route("/info", get(handlers::info))
        // Retained multi-file results
        .nest_service("/static", static_files)
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
