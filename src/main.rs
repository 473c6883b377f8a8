use std::process::ExitCode;

use tracing::{error, info, warn};

use docupload::{Config, WebServer};

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration
    let mut config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    // Initialize logging
    if let Err(e) = docupload::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        docupload::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.apply_env_overrides() {
        warn!("Ignoring environment override: {e}");
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {e}");
        return ExitCode::FAILURE;
    }

    info!("docupload - document upload service");

    let server = match WebServer::new(&config) {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to start web server: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = server.run().await {
        error!("Web server error: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
