//! HTTP Request Handlers
//!
//! This module contains all HTTP request handlers organized by domain.

pub mod auth;
pub mod competitions;
pub mod dashboard;
pub mod health;
pub mod participations;
pub mod profile;

use axum::Router;

use crate::state::AppState;

/// Create all API routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .nest("/auth", auth::routes())
        .nest("/competitions", competitions::routes())
        .nest("/participations", participations::routes())
        .nest("/profile", profile::routes())
        .nest("/dashboard", dashboard::routes())
}
