use portal_service::{
    config::{Environment, PortalConfig},
    services::init_metrics,
    Application,
};
use service_core::observability::{init_tracing, LogFormat};

#[tokio::main]
async fn main() -> Result<(), service_core::error::AppError> {
    let config = PortalConfig::from_env()?;

    let format = match config.environment {
        Environment::Prod => LogFormat::Json,
        Environment::Dev => LogFormat::Pretty,
    };
    init_tracing(&config.service_name, &config.log_level, format);

    init_metrics();

    tracing::info!(
        service = %config.service_name,
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.environment,
        store = ?config.store,
        "Starting portal service"
    );

    let application = Application::build(config).await?;
    application.run_until_stopped().await?;

    Ok(())
}
