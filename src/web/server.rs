//! Web server.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::{Config, WebConfig};
use crate::upload::UploadService;
use crate::{Result, UploadError};

use super::handlers::AppState;
use super::router::create_router;

/// HTTP server for the upload service.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// Web configuration.
    web_config: WebConfig,
}

impl WebServer {
    /// Create a new web server.
    ///
    /// Creates the upload directory if it does not exist yet.
    pub fn new(config: &Config) -> Result<Self> {
        let addr = format!("{}:{}", config.server.host, config.server.port)
            .parse::<SocketAddr>()
            .map_err(|e| {
                UploadError::Config(format!(
                    "invalid server address {}:{}: {e}",
                    config.server.host, config.server.port
                ))
            })?;

        let uploads = UploadService::from_config(&config.files)?;
        tracing::info!(
            upload_dir = %uploads.storage().base_path().display(),
            metadata = %uploads.store().path().display(),
            max_upload_mb = config.files.max_upload_size_mb,
            "Upload storage initialized"
        );

        Ok(Self {
            addr,
            app_state: Arc::new(AppState::new(uploads)),
            web_config: config.web.clone(),
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Run the web server.
    pub async fn run(self) -> std::result::Result<(), std::io::Error> {
        let router = create_router(self.app_state, &self.web_config);

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Servidor en puerto {}", local_addr.port());

        axum::serve(listener, router).await
    }

    /// Run the server and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> std::result::Result<SocketAddr, std::io::Error> {
        let router = create_router(self.app_state, &self.web_config);

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}
