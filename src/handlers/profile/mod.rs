//! Profile handlers

mod handler;
pub mod request;

pub use handler::*;
pub use request::*;

use axum::{routing::put, Router};

use crate::state::AppState;

/// Profile routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/update", put(handler::update_profile))
}
