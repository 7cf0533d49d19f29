//! Competition handlers

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;
pub use response::*;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Competition routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list_competitions).post(handler::create_competition))
        .route("/map", get(handler::map_markers))
        .route("/export", get(handler::export_competitions))
        .route("/import", post(handler::import_competitions))
        .route("/{slug}", get(handler::get_competition))
}
