use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryCrossingRepository, LogNotifier};
use crate::routes::with_crossing_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use border_crossing::config::AppConfig;
use border_crossing::crossings::CrossingService;
use border_crossing::error::AppError;
use border_crossing::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let crossing_service = Arc::new(CrossingService::new(
        Arc::new(InMemoryCrossingRepository::default()),
        Arc::new(LogNotifier),
        config.review,
    ));

    let app = with_crossing_routes(crossing_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        queue_limit = config.review.queue_limit,
        "border crossing control ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
