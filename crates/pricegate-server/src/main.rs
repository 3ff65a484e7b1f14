//! # Pricegate Server
//!
//! Entry point: load configuration, wire components, serve HTTP until
//! SIGINT/SIGTERM.

use pricegate_config::{AppConfig, ConfigLoader, ConfigValidator};
use pricegate_core::{PricegateError, PricegateResult};
use pricegate_rest::create_router;
use pricegate_server::{di::AppComponentsBuilder, logging::init_logging, startup};
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let config = ConfigLoader::from_default_location().load();
    match &config {
        Ok(config) => init_logging(&config.observability),
        Err(_) => init_logging(&Default::default()),
    }

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    startup::print_banner();
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!(environment = %config.app.environment, "Configuration loaded");
    for warning in ConfigValidator::warnings(&config) {
        warn!("{}", warning);
    }

    if let Err(e) = run(config).await {
        error!("Application error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> PricegateResult<()> {
    let components = AppComponentsBuilder::new(config.clone()).build().await?;
    let router = create_router(components.app_state(), &config.server);

    let addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| PricegateError::Internal(format!("Failed to bind {addr}: {e}")))?;

    startup::print_startup_info(&config);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| PricegateError::Internal(format!("Server error: {e}")))?;

    components.database.close().await;
    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            info!("Received terminate signal, initiating graceful shutdown...");
        }
    }
}
