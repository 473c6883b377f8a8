//! API handlers.

pub mod upload;

pub use upload::*;

use crate::upload::UploadService;

/// Shared state for request handlers.
#[derive(Debug)]
pub struct AppState {
    /// Upload flow.
    pub uploads: UploadService,
}

impl AppState {
    /// Create a new AppState.
    pub fn new(uploads: UploadService) -> Self {
        Self { uploads }
    }
}
