use service_core::observability::init_tracing;
use tokio::signal;
use upload_gateway::config::GatewayConfig;
use upload_gateway::services::init_metrics;
use upload_gateway::startup::Application;

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Initialize metrics recorder (must be before any metrics are recorded)
    init_metrics();

    let config = GatewayConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    init_tracing(
        "upload-gateway",
        &config.common.log_level,
        config.common.otlp_endpoint.as_deref(),
    );

    tracing::info!(backend = ?config.blob.backend, "Starting upload-gateway");

    let app = Application::build_with_shutdown(config, shutdown_signal())
        .await
        .map_err(|e| {
            tracing::error!("Failed to build application: {}", e);
            std::io::Error::other(format!("Startup error: {}", e))
        })?;

    app.run_until_stopped().await
}
