//! SessionHub Server — real-time session broker for multi-client
//! applications.
//!
//! Main entry point that wires the crates together and starts the server.

use tracing_subscriber::{EnvFilter, fmt};

use sessionhub_broker::SessionBroker;
use sessionhub_core::config::AppConfig;
use sessionhub_core::error::AppError;
use sessionhub_gateway::Gateway;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("SESSIONHUB_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting SessionHub v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Plaintext port: {}", config.gateway.port);
    if config.gateway.tls.enabled {
        tracing::info!("TLS port: {}", config.gateway.tls.port);
    }
    tracing::info!("Max clients: {}", config.broker.max_clients);
    tracing::info!("Max sessions: {}", config.broker.max_sessions);
    tracing::info!(
        "Max clients per session: {}",
        config.broker.max_clients_per_session
    );
    tracing::info!(
        "Id recycle threshold: {}",
        config.broker.id_recycle_threshold
    );

    let broker = SessionBroker::new(config.broker.clone());
    let gateway = Gateway::bind(broker, config.gateway.clone()).await?;

    tokio::select! {
        res = gateway.serve() => res,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
            Ok(())
        }
    }
}
