use crate::cli::ServeArgs;
use crate::demo::load_demo_site;
use crate::infra::{load_catalog, AppState};
use crate::routes::app_router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use espaco_vital::catalog::DirectoryService;
use espaco_vital::config::AppConfig;
use espaco_vital::error::AppError;
use espaco_vital::site::{InMemorySite, SiteService};
use espaco_vital::telemetry;
use std::net::SocketAddr;
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

    let catalog = load_catalog(&config.catalog)?;
    let site = InMemorySite::new();
    let faqs = load_demo_site(&site)?;
    info!(faqs, "site content loaded");

    let directory = Arc::new(DirectoryService::new(Arc::new(catalog)));
    let site = Arc::new(SiteService::new(Arc::new(site)));

    let app = app_router(directory, site)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "espaço vital directory ready");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
