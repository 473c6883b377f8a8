//! Document upload module.
//!
//! This module provides the upload flow:
//! - MIME allow-list and size validation
//! - File storage with UUID naming
//! - Append-only JSON metadata log

mod metadata;
mod policy;
mod record;
mod service;
mod storage;

pub use metadata::MetadataStore;
pub use policy::{mime_essence, Rejection, UploadPolicy};
pub use record::{Requester, UploadedFileRecord, UPLOADS_URL_PREFIX};
pub use service::{IncomingFile, UploadService};
pub use storage::FileStorage;

/// Multipart field carrying the file.
pub const FILE_FIELD: &str = "documento";

/// Multipart field carrying the requester's name.
pub const NAME_FIELD: &str = "name";

/// Multipart field carrying the requester's email.
pub const EMAIL_FIELD: &str = "email";
