//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST routes for leave and payroll
//! - JWT authentication middleware that yields an [`ActorContext`]
//! - Mapping from domain errors to `{ error, message }` responses
//!
//! [`ActorContext`]: payline_core::ActorContext

pub mod error;
pub mod middleware;
pub mod routes;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use payline_core::audit::AuditSink;
use payline_core::cache::TtlStore;
use payline_core::payroll::RunSettings;
use payline_shared::JwtService;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token verification.
    pub jwt_service: Arc<JwtService>,
    /// Destination for audit events.
    pub audit: Arc<dyn AuditSink>,
    /// Cache of serialized payrun details, keyed `payrun:{id}`.
    pub payrun_cache: Arc<dyn TtlStore<serde_json::Value>>,
    /// Payroll settings from configuration.
    pub run_settings: Arc<RunSettings>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
