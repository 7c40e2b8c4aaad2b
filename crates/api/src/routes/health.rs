//! Liveness and readiness probes. Both are public.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;

use crate::AppState;

/// Probe response body.
#[derive(Debug, Serialize)]
pub struct Probe {
    /// `ok`, `ready` or `unavailable`.
    pub status: &'static str,
    /// Always `payline`.
    pub service: &'static str,
    /// Crate version.
    pub version: &'static str,
}

impl Probe {
    const fn with_status(status: &'static str) -> Self {
        Self {
            status,
            service: "payline",
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

async fn liveness() -> Json<Probe> {
    Json(Probe::with_status("ok"))
}

/// 503 until the database answers a ping.
async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<Probe>) {
    match state.db.ping().await {
        Ok(()) => (StatusCode::OK, Json(Probe::with_status("ready"))),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, Json(Probe::with_status("unavailable")))
        }
    }
}

/// Public probe routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(liveness))
        .route("/health/ready", get(readiness))
}
