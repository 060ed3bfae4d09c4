use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use border_crossing::crossings::{crossing_router, CrossingRepository, CrossingService, Notifier};
use border_crossing::{classify, format_rut, validate_rut, RiskInput, RiskLevel};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct RutRequest {
    pub(crate) rut: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct RutResponse {
    pub(crate) rut: String,
    pub(crate) valid: bool,
    pub(crate) formatted: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct RiskResponse {
    pub(crate) risk_level: RiskLevel,
}

pub(crate) fn with_crossing_routes<R, N>(service: Arc<CrossingService<R, N>>) -> axum::Router
where
    R: CrossingRepository + 'static,
    N: Notifier + 'static,
{
    crossing_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/rut/validate",
            axum::routing::post(rut_validate_endpoint),
        )
        .route(
            "/api/v1/risk/classify",
            axum::routing::post(risk_classify_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn rut_validate_endpoint(Json(payload): Json<RutRequest>) -> Json<RutResponse> {
    let valid = validate_rut(&payload.rut);
    let formatted = format_rut(&payload.rut);
    Json(RutResponse {
        rut: payload.rut,
        valid,
        formatted,
    })
}

pub(crate) async fn risk_classify_endpoint(Json(input): Json<RiskInput>) -> Json<RiskResponse> {
    Json(RiskResponse {
        risk_level: classify(&input),
    })
}
