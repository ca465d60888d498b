use crate::cli::ServeArgs;
use crate::infra::{demo_catalog, seed_catalog, AppState, Services};
use crate::routes::with_configurator_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use configurator::config::AppConfig;
use configurator::error::AppError;
use configurator::telemetry;
use configurator::workflows::leads::ConfiguredGateway;
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

    let gateway = Arc::new(ConfiguredGateway::from_config(&config.erp)?);
    let demo = demo_catalog()?;
    seed_catalog(&demo.catalog, &args.seed())?;
    let services = Services::new(Arc::new(demo.catalog), gateway, config.erp.clone());

    let app = with_configurator_routes(&services)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        erp_enabled = config.erp.enabled,
        "product configurator ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
