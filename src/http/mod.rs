//! HTTP API server
//!
//! This module exposes the download service:
//! - GET / - Liveness message
//! - GET /download - Download (optionally trimmed) media as a single file
//! - GET /download/instagram - Download a social post, possibly several files
//! - GET /info - Title and largest file size without downloading
//! - GET /routes-debug - Registered API paths
//! - GET /static/... - Files of retained multi-file sessions

mod body;
mod handlers;
mod routes;
mod state;

pub use body::{file_response, GuardedStream};
pub use routes::{create_router, API_ROUTES};
pub use state::AppState;
