use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{CrossingSubmission, RequestId, ReviewDecision};
use super::notify::Notifier;
use super::repository::{CrossingRepository, CrossingStatusView, RepositoryError};
use super::service::{CrossingService, CrossingServiceError};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct QueueParams {
    pub(crate) limit: Option<usize>,
}

/// HTTP endpoints for request intake, the review queue, decisions, and the audit log.
pub fn crossing_router<R, N>(service: Arc<CrossingService<R, N>>) -> Router
where
    R: CrossingRepository + 'static,
    N: Notifier + 'static,
{
    Router::new()
        .route(
            "/api/v1/crossings",
            post(submit_handler::<R, N>).get(queue_handler::<R, N>),
        )
        .route(
            "/api/v1/crossings/:request_id",
            get(status_handler::<R, N>),
        )
        .route(
            "/api/v1/crossings/:request_id/review",
            post(review_handler::<R, N>),
        )
        .route(
            "/api/v1/crossings/:request_id/audit",
            get(audit_handler::<R, N>),
        )
        .with_state(service)
}

pub(crate) async fn submit_handler<R, N>(
    State(service): State<Arc<CrossingService<R, N>>>,
    axum::Json(submission): axum::Json<CrossingSubmission>,
) -> Response
where
    R: CrossingRepository + 'static,
    N: Notifier + 'static,
{
    match service.submit(submission) {
        Ok(record) => (StatusCode::ACCEPTED, axum::Json(record.status_view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn queue_handler<R, N>(
    State(service): State<Arc<CrossingService<R, N>>>,
    Query(params): Query<QueueParams>,
) -> Response
where
    R: CrossingRepository + 'static,
    N: Notifier + 'static,
{
    let limit = params.limit.unwrap_or(service.config().queue_limit);
    match service.pending(limit) {
        Ok(records) => {
            let views: Vec<CrossingStatusView> =
                records.iter().map(|record| record.status_view()).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn status_handler<R, N>(
    State(service): State<Arc<CrossingService<R, N>>>,
    Path(request_id): Path<String>,
) -> Response
where
    R: CrossingRepository + 'static,
    N: Notifier + 'static,
{
    match service.get(&RequestId(request_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn review_handler<R, N>(
    State(service): State<Arc<CrossingService<R, N>>>,
    Path(request_id): Path<String>,
    axum::Json(decision): axum::Json<ReviewDecision>,
) -> Response
where
    R: CrossingRepository + 'static,
    N: Notifier + 'static,
{
    match service.review(&RequestId(request_id), decision) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn audit_handler<R, N>(
    State(service): State<Arc<CrossingService<R, N>>>,
    Path(request_id): Path<String>,
) -> Response
where
    R: CrossingRepository + 'static,
    N: Notifier + 'static,
{
    match service.audit_trail(&RequestId(request_id)) {
        Ok(entries) => (StatusCode::OK, axum::Json(entries)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: CrossingServiceError) -> Response {
    let status = match &err {
        CrossingServiceError::Intake(_) | CrossingServiceError::MissingInspector => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        CrossingServiceError::Repository(RepositoryError::Conflict)
        | CrossingServiceError::Repository(RepositoryError::AlreadyResolved(_))
        | CrossingServiceError::AlreadyResolved { .. } => StatusCode::CONFLICT,
        CrossingServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        CrossingServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({ "error": err.to_string() });
    (status, axum::Json(payload)).into_response()
}
