use crate::cli::ServeArgs;
use crate::infra::{build_service, AppState};
use crate::routes::with_prioritization_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use test_prioritizer::config::AppConfig;
use test_prioritizer::error::AppError;
use test_prioritizer::telemetry;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, config.environment)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let service = Arc::new(build_service(&config.prioritization)?);
    let thresholds = service.engine().thresholds();
    info!(
        factors = service.registry().factors().len(),
        max_weighted_score = service.registry().max_weighted_score(),
        highest = thresholds.highest_threshold(),
        high = thresholds.high_threshold(),
        medium = thresholds.medium_threshold(),
        low = thresholds.low_threshold(),
        "factor catalog loaded"
    );

    let app = with_prioritization_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "test prioritizer listening");

    axum::serve(listener, app).await?;
    Ok(())
}
