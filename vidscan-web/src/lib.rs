//! Browser front end for vidscan: one page of HTML plus a small JSON API.
//!
//! Scans are blocking CSV reads, so every scan runs on tokio's blocking pool.
//! Each browser tab gets its own paging session keyed by the `x-session-id`
//! header.

#![forbid(unsafe_code)]

pub mod error;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use state::{AppState, SESSION_HEADER};

pub fn app(state: AppState) -> Router {
    routes::router(state).layer(TraceLayer::new_for_http())
}
