//! HTTP entry points for report intake and the worker lifecycle actions.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::zones::WorkerRegistry;

use super::domain::{MediaRef, ReportId, ReportSubmission, StatusChange, UserId};
use super::notification::NotificationSink;
use super::repository::{ReportRepository, RepositoryError};
use super::service::{ReportService, ReportServiceError, ValidationError};

/// Router builder exposing the report lifecycle over HTTP.
pub fn report_router<R, W, N>(service: Arc<ReportService<R, W, N>>) -> Router
where
    R: ReportRepository + 'static,
    W: WorkerRegistry + 'static,
    N: NotificationSink + 'static,
{
    Router::new()
        .route("/api/v1/reports", post(submit_handler::<R, W, N>))
        .route("/api/v1/reports/:report_id", get(get_handler::<R, W, N>))
        .route(
            "/api/v1/reports/:report_id/status",
            patch(status_handler::<R, W, N>),
        )
        .route(
            "/api/v1/reports/:report_id/close",
            post(close_handler::<R, W, N>),
        )
        .route(
            "/api/v1/reports/:report_id/viewed",
            post(viewed_handler::<R, W, N>),
        )
        .route(
            "/api/v1/unviewed-reports",
            get(unviewed_handler::<R, W, N>),
        )
        .with_state(service)
}

/// Status arrives as the wire string so unknown values reject with the same
/// shape as every other validation failure.
#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
    pub actor: UserId,
    #[serde(default)]
    pub completion_evidence: Option<MediaRef>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CloseRequest {
    pub actor: UserId,
}

#[derive(Debug, Deserialize)]
pub struct UnviewedQuery {
    pub worker: UserId,
}

pub(crate) async fn submit_handler<R, W, N>(
    State(service): State<Arc<ReportService<R, W, N>>>,
    axum::Json(submission): axum::Json<ReportSubmission>,
) -> Response
where
    R: ReportRepository + 'static,
    W: WorkerRegistry + 'static,
    N: NotificationSink + 'static,
{
    match service.submit(submission) {
        Ok(report) => (StatusCode::CREATED, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_handler<R, W, N>(
    State(service): State<Arc<ReportService<R, W, N>>>,
    Path(report_id): Path<String>,
) -> Response
where
    R: ReportRepository + 'static,
    W: WorkerRegistry + 'static,
    N: NotificationSink + 'static,
{
    match service.get(&ReportId(report_id)) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<R, W, N>(
    State(service): State<Arc<ReportService<R, W, N>>>,
    Path(report_id): Path<String>,
    axum::Json(request): axum::Json<StatusUpdateRequest>,
) -> Response
where
    R: ReportRepository + 'static,
    W: WorkerRegistry + 'static,
    N: NotificationSink + 'static,
{
    let status = match request.status.parse() {
        Ok(status) => status,
        Err(unknown) => {
            return error_response(ValidationError::UnknownStatus(unknown).into());
        }
    };

    let change = StatusChange {
        status,
        completion_evidence: request.completion_evidence,
        notes: request.notes,
    };

    match service.transition_status(&ReportId(report_id), change, &request.actor) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn close_handler<R, W, N>(
    State(service): State<Arc<ReportService<R, W, N>>>,
    Path(report_id): Path<String>,
    axum::Json(request): axum::Json<CloseRequest>,
) -> Response
where
    R: ReportRepository + 'static,
    W: WorkerRegistry + 'static,
    N: NotificationSink + 'static,
{
    match service.close(&ReportId(report_id), &request.actor) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn viewed_handler<R, W, N>(
    State(service): State<Arc<ReportService<R, W, N>>>,
    Path(report_id): Path<String>,
) -> Response
where
    R: ReportRepository + 'static,
    W: WorkerRegistry + 'static,
    N: NotificationSink + 'static,
{
    match service.mark_viewed(&ReportId(report_id)) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn unviewed_handler<R, W, N>(
    State(service): State<Arc<ReportService<R, W, N>>>,
    Query(query): Query<UnviewedQuery>,
) -> Response
where
    R: ReportRepository + 'static,
    W: WorkerRegistry + 'static,
    N: NotificationSink + 'static,
{
    match service.unviewed_count(&query.worker) {
        Ok(count) => (StatusCode::OK, axum::Json(json!({ "count": count }))).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: ReportServiceError) -> Response {
    let status = match &error {
        ReportServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ReportServiceError::NotSubmitter => StatusCode::FORBIDDEN,
        ReportServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ReportServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ReportServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
