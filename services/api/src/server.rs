use crate::cli::ServeArgs;
use crate::infra::{load_repository, AppState};
use crate::routes::with_eligibility_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Local;
use dsnap_rules::config::AppConfig;
use dsnap_rules::eligibility::EligibilityService;
use dsnap_rules::error::AppError;
use dsnap_rules::telemetry;
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
    if let Some(path) = args.disasters.take() {
        config.disasters_csv = Some(path);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let today = Local::now().date_naive();
    let repository = load_repository(config.disasters_csv.as_deref(), today)?;
    info!(
        disasters = repository.len(),
        source = ?config.disasters_csv,
        "disaster policies loaded"
    );
    let eligibility_service = Arc::new(EligibilityService::new(
        Arc::new(repository),
        config.eligibility,
    )?);
    let rules = eligibility_service.config();
    info!(
        conflicting_program_rule = rules.conflicting_program_rule,
        state_residency_rule = rules.state_residency_rule,
        "eligibility rule chain configured"
    );

    let app = with_eligibility_routes(eligibility_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "dsnap eligibility service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
