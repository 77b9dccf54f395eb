use axum::http::{header, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use super::common::*;
use crate::reports::router::report_router;

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<axum::body::Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(body.to_string()))
        .expect("request builds")
}

#[tokio::test]
async fn submit_route_creates_reports() {
    let (service, _, _) = build_service();
    let router = report_router(service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/reports",
            serde_json::to_value(submission()).expect("serializes"),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["zone"], "Zone 5");
    assert_eq!(payload["status"], "SENT");
    assert_eq!(payload["assigned_worker"], "crew-5");
    assert!(payload["id"].as_str().expect("id present").starts_with("rpt-"));
}

#[tokio::test]
async fn status_route_rejects_unknown_statuses() {
    let (service, _, _) = build_service();
    let report = service.submit(submission()).expect("submission succeeds");
    let router = report_router(service);

    let response = router
        .oneshot(json_request(
            "PATCH",
            &format!("/api/v1/reports/{}/status", report.id.0),
            json!({ "status": "DONE", "actor": "crew-5" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .expect("error present")
        .contains("DONE"));
}

#[tokio::test]
async fn status_route_requires_evidence_for_completion() {
    let (service, _, _) = build_service();
    let report = service.submit(submission()).expect("submission succeeds");
    let router = report_router(service);

    let response = router
        .oneshot(json_request(
            "PATCH",
            &format!("/api/v1/reports/{}/status", report.id.0),
            json!({ "status": "COMPLETED", "actor": "crew-5" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn status_route_updates_reports() {
    let (service, _, _) = build_service();
    let report = service.submit(submission()).expect("submission succeeds");
    let router = report_router(service);

    let response = router
        .oneshot(json_request(
            "PATCH",
            &format!("/api/v1/reports/{}/status", report.id.0),
            json!({
                "status": "COMPLETED",
                "actor": "crew-5",
                "completion_evidence": "media/evidence/after.jpg",
                "notes": "Cleared"
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["status"], "COMPLETED");
    assert_eq!(payload["worker_notes"], "Cleared");
    assert!(!payload["completed_at"].is_null());
}

#[tokio::test]
async fn close_route_rejects_non_submitters() {
    let (service, _, _) = build_service();
    let report = service.submit(submission()).expect("submission succeeds");
    let router = report_router(service);

    let response = router
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/reports/{}/close", report.id.0),
            json!({ "actor": "crew-5" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn missing_reports_are_not_found() {
    let (service, _, _) = build_service();
    let router = report_router(service);

    let response = router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/v1/reports/rpt-999999")
                .body(axum::body::Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn viewed_route_flips_the_read_receipt() {
    let (service, _, _) = build_service();
    let report = service.submit(submission()).expect("submission succeeds");
    let router = report_router(service);

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/v1/reports/{}/viewed", report.id.0))
                .body(axum::body::Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["viewed"], true);
}

#[tokio::test]
async fn unviewed_route_counts_for_one_worker() {
    let (service, _, _) = build_service();
    service.submit(submission()).expect("submission succeeds");
    service.submit(submission()).expect("submission succeeds");
    let router = report_router(service);

    let response = router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/v1/unviewed-reports?worker=crew-5")
                .body(axum::body::Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["count"], 2);
}
