//! Shared helpers for router tests.
//!
//! The router runs against a disconnected database, so only paths that fail
//! before touching storage (authentication, authorization, validation,
//! previews) are exercised here.

#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use payline_api::{AppState, create_router};
use payline_db::TracingAuditSink;
use payline_core::cache::MokaTtlStore;
use payline_core::payroll::RunSettings;
use payline_shared::types::UserId;
use payline_shared::{JwtConfig, JwtService};

pub const SECRET: &str = "router-test-secret";

pub fn jwt() -> JwtService {
    JwtService::new(&JwtConfig {
        secret: SECRET.to_string(),
    })
}

pub fn app() -> Router {
    create_router(AppState {
        db: Arc::new(DatabaseConnection::default()),
        jwt_service: Arc::new(jwt()),
        audit: Arc::new(TracingAuditSink),
        payrun_cache: Arc::new(MokaTtlStore::new()),
        run_settings: Arc::new(RunSettings::default()),
    })
}

/// Returns a fresh user id and a valid token for `role`.
pub fn token(role: &str) -> (Uuid, String) {
    let user_id = Uuid::now_v7();
    let token = jwt()
        .issue_token(UserId::from_uuid(user_id), role, chrono::Duration::hours(1))
        .unwrap();
    (user_id, token)
}

/// Sends one request and returns the status and the JSON body (`Null` if empty).
pub async fn send(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}
