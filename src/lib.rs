//! Rimappa - Freestyle Rap Competition Service
//!
//! This library provides the core functionality for Rimappa, a platform
//! where organizers publish freestyle rap competitions, competitors ask to
//! join them and everyone can find them on a map.
//!
//! # Features
//!
//! - Competition publishing with address geocoding
//! - Participation requests with capacity enforcement
//! - Bulk CSV import/export with slug-based reconciliation
//! - Role-based access control over JWT sessions
//!
//! # Architecture
//!
//! The application follows a layered architecture:
//! - **Handlers**: HTTP request handlers (thin layer)
//! - **Services**: Business logic
//! - **Import**: CSV parsing, validation, geocoding and the reconciliation pipeline
//! - **Repositories**: Database access
//! - **Models**: Domain models and DTOs

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod handlers;
pub mod import;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;

use axum::{extract::DefaultBodyLimit, http::HeaderValue, middleware as axum_middleware, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowHeaders, AllowMethods, CorsLayer},
    trace::TraceLayer,
};

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::AppState;

use crate::constants::API_BASE_PATH;

/// Build the full application router around a prepared state
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let origin = HeaderValue::from_str(state.config().session.url.trim_end_matches('/'))?;
    let body_limit = state.config().server.max_import_bytes;

    let router = Router::new()
        .nest(API_BASE_PATH, handlers::routes())
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods(AllowMethods::mirror_request())
                .allow_headers(AllowHeaders::mirror_request())
                .allow_credentials(true),
        )
        .with_state(state);

    Ok(router)
}
