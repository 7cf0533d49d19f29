//! Dashboard handlers

mod handler;
pub mod request;

pub use handler::*;
pub use request::*;

use axum::{routing::get, Router};

use crate::state::AppState;

/// Dashboard routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(handler::get_stats))
        .route("/activity", get(handler::get_activity))
}
