use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryIntakeStore};
use crate::routes::with_service_routes;
use axum::{Extension, Router};
use axum_prometheus::PrometheusMetricLayer;
use dorm_intake::config::AppConfig;
use dorm_intake::error::AppError;
use dorm_intake::telemetry;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
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

    let readiness = Arc::new(AtomicBool::new(false));
    let app = build_app(Arc::new(InMemoryIntakeStore::default()), readiness.clone());

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    readiness.store(true, Ordering::Release);

    info!(?config.environment, %addr, "dormitory intake backend ready");

    axum::serve(listener, app).await?;
    Ok(())
}

pub(crate) fn build_app(store: Arc<InMemoryIntakeStore>, readiness: Arc<AtomicBool>) -> Router {
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let app_state = AppState {
        readiness,
        metrics: Arc::new(prometheus_handle),
    };

    with_service_routes(store)
        .layer(Extension(app_state))
        .layer(prometheus_layer)
}

/// Serve only the intake routes on an ephemeral loopback port.
pub(crate) async fn spawn_local(
    store: Arc<InMemoryIntakeStore>,
) -> Result<SocketAddr, AppError> {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
    let addr = listener.local_addr()?;
    let app = crate::routes::intake_router(store);

    tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, app).await {
            tracing::error!(%err, "local intake backend stopped");
        }
    });

    info!(%addr, "local intake backend listening");
    Ok(addr)
}
