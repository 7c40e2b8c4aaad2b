//! Leave routes that resolve before storage is reached.

mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;
use uuid::Uuid;

use common::{send, token};

#[tokio::test]
async fn test_apply_with_reversed_range_is_rejected() {
    let (_, token) = token("employee");
    let (status, body) = send(
        Method::POST,
        "/api/v1/leaves",
        Some(&token),
        Some(json!({
            "type": "CASUAL",
            "startDate": "2025-03-12",
            "endDate": "2025-03-10",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_apply_with_unknown_type_is_rejected() {
    let (_, token) = token("employee");
    let (status, body) = send(
        Method::POST,
        "/api/v1/leaves",
        Some(&token),
        Some(json!({
            "type": "SABBATICAL",
            "startDate": "2025-03-10",
            "endDate": "2025-03-12",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("SABBATICAL"));
}

#[tokio::test]
async fn test_apply_with_bad_date_is_rejected() {
    let (_, token) = token("employee");
    let (status, body) = send(
        Method::POST,
        "/api/v1/leaves",
        Some(&token),
        Some(json!({
            "type": "SICK",
            "startDate": "10/03/2025",
            "endDate": "2025-03-12",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_apply_with_missing_fields_is_rejected() {
    let (_, token) = token("employee");
    let (status, body) = send(
        Method::POST,
        "/api/v1/leaves",
        Some(&token),
        Some(json!({ "type": "SICK" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_employee_cannot_approve_or_reject() {
    let (_, token) = token("employee");
    let id = Uuid::now_v7();

    let (status, body) = send(
        Method::PUT,
        &format!("/api/v1/leaves/{id}/approve"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");

    let (status, _) = send(
        Method::PUT,
        &format!("/api/v1/leaves/{id}/reject"),
        Some(&token),
        Some(json!({ "reason": "no" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_employee_cannot_read_other_balances() {
    let (_, token) = token("employee");
    let other = Uuid::now_v7();
    let (status, _) = send(
        Method::GET,
        &format!("/api/v1/leaves/balances/{other}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_list_with_unknown_status_is_rejected() {
    let (_, token) = token("hr");
    let (status, _) = send(
        Method::GET,
        "/api/v1/leaves?status=archived",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_leave_with_malformed_id_is_rejected() {
    let (_, token) = token("employee");
    let (status, _) = send(Method::GET, "/api/v1/leaves/not-a-uuid", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
