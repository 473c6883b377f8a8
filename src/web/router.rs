//! Router configuration.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::config::WebConfig;
use crate::upload::UPLOADS_URL_PREFIX;

use super::handlers::{upload_file, AppState};
use super::middleware::security_headers;

/// Room left in the request body for form fields and multipart framing.
const FORM_OVERHEAD_BYTES: u64 = 1024 * 1024;

/// Create the main router.
///
/// - `GET /` serves the upload form
/// - `POST /upload` accepts a document
/// - `GET /uploads/<stored_name>` serves stored files
pub fn create_router(app_state: Arc<AppState>, web_config: &WebConfig) -> Router {
    let body_limit = app_state.uploads.policy().max_bytes() + FORM_OVERHEAD_BYTES;
    let upload_dir = app_state.uploads.storage().base_path().to_path_buf();

    let upload_routes = Router::new()
        .route("/upload", post(upload_file))
        .layer(DefaultBodyLimit::max(
            usize::try_from(body_limit).unwrap_or(usize::MAX),
        ));

    Router::new()
        .route_service("/", ServeFile::new(&web_config.index_path))
        .nest_service(UPLOADS_URL_PREFIX, ServeDir::new(upload_dir))
        .merge(upload_routes)
        .merge(create_health_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(security_headers)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router<S: Clone + Send + Sync + 'static>() -> Router<S> {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
