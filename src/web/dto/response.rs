//! Response DTOs for Web API.

use serde::Serialize;

use crate::upload::UploadedFileRecord;

/// Successful upload response: `{"ok": true, "metadata": {...}}`.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub ok: bool,
    /// The record appended to the metadata log.
    pub metadata: UploadedFileRecord,
}

impl UploadResponse {
    /// Create a new upload response.
    pub fn new(metadata: UploadedFileRecord) -> Self {
        Self { ok: true, metadata }
    }
}
