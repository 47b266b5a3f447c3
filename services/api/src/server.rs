use crate::cli::ServeArgs;
use crate::infra::{AppState, EngagementStack};
use crate::routes::with_engagement_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use checkup::auth::{authenticator_for, ApiContext};
use checkup::config::AppConfig;
use checkup::engagement::SystemClock;
use checkup::error::AppError;
use checkup::telemetry;
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

    let stack = EngagementStack::in_memory(Arc::new(SystemClock));
    let context = ApiContext::new(authenticator_for(&config.auth), config.environment);

    let app = with_engagement_routes(&stack, context)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        auth_mode = ?config.auth.mode,
        %addr,
        "account checkup service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
