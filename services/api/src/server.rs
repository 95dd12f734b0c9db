use crate::cli::ServeArgs;
use crate::infra::{
    seed_default_admin, AppState, InMemoryInterestStore, InMemoryOpeningStore,
    InMemorySelectionStore, InMemoryUserStore,
};
use crate::routes::with_portal_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use placement_cell::config::AppConfig;
use placement_cell::error::AppError;
use placement_cell::portal::PortalServices;
use placement_cell::telemetry;
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

    let users = Arc::new(InMemoryUserStore::default());
    let openings = Arc::new(InMemoryOpeningStore::default());
    let selections = Arc::new(InMemorySelectionStore::default());
    let interests = Arc::new(InMemoryInterestStore::default());

    match seed_default_admin(users.as_ref()) {
        Ok(admin) => info!(email = %admin.email, "default admin account available"),
        Err(err) => tracing::warn!(%err, "could not seed default admin account"),
    }

    let services = Arc::new(PortalServices::new(users, openings, selections, interests));

    let app = with_portal_routes(services)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "placement portal ready");

    axum::serve(listener, app).await?;
    Ok(())
}
