use crate::cli::ServeArgs;
use crate::infra::{seeded_store, AppState, LoggingMailDispatcher};
use crate::routes::with_hiring_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Utc;
use hireboard::config::AppConfig;
use hireboard::error::AppError;
use hireboard::telemetry;
use hireboard::workflows::hiring::HiringWorkflowService;
use std::sync::atomic::Ordering;
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
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(seeded_store(Utc::now()));
    let mail = Arc::new(LoggingMailDispatcher::default());
    let hiring_service = Arc::new(HiringWorkflowService::from_config(
        store,
        mail,
        &config.hiring,
    ));

    let app = with_hiring_routes(hiring_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        policy = ?config.hiring.policy,
        "hireboard application workflow ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
