//! Error types for the upload service.

use thiserror::Error;

/// Common error type for the upload service.
#[derive(Error, Debug)]
pub enum UploadError {
    /// The declared MIME type is not in the allow-list.
    #[error("Tipo de archivo no permitido")]
    Validation(String),

    /// The file is larger than the configured maximum.
    #[error("File too large (max {max_mb}MB)")]
    SizeLimit {
        /// Configured limit in megabytes.
        max_mb: u64,
    },

    /// The request carried no file part.
    #[error("No se envió archivo")]
    MissingFile,

    /// A file part arrived under a field name that is not accepted.
    #[error("Unexpected field")]
    UnexpectedField(String),

    /// The multipart body could not be parsed.
    #[error("invalid multipart data: {0}")]
    Multipart(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Metadata serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl UploadError {
    /// Whether the error was caused by the client's request rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            UploadError::Validation(_)
                | UploadError::SizeLimit { .. }
                | UploadError::MissingFile
                | UploadError::UnexpectedField(_)
                | UploadError::Multipart(_)
        )
    }
}

/// Result type alias for upload operations.
pub type Result<T> = std::result::Result<T, UploadError>;
