use std::process::ExitCode;

use tracing::{error, info};

use textchat::server::{self, ChatServer, ConnectionLimits};
use textchat::Config;

#[tokio::main]
async fn main() -> ExitCode {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    // Load configuration
    let mut config = match Config::load(&path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {path}: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };
    config.apply_env_overrides();

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        return ExitCode::FAILURE;
    }

    // Initialize logging
    if let Err(e) = textchat::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        textchat::logging::init_console_only(&config.logging.level);
    }

    info!("textchat server starting");

    let router = server::build_router(&config);
    let listener = match ChatServer::bind(&config.server).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(
                "Failed to bind {}:{}: {}",
                config.server.host, config.server.port, e
            );
            return ExitCode::FAILURE;
        }
    };

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Shutdown requested");
    };

    let limits = ConnectionLimits::from(&config.server);
    if let Err(e) = server::run(listener, router, limits, shutdown).await {
        error!("Server stopped with error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("textchat server stopped");
    ExitCode::SUCCESS
}
