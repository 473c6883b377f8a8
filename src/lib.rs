//! docupload - Document upload service
//!
//! Accepts one document per request over HTTP, validates its type and size,
//! stores it under a generated name and keeps a JSON log of every upload.

pub mod config;
pub mod datetime;
pub mod error;
pub mod logging;
pub mod upload;
pub mod web;

pub use config::Config;
pub use error::{Result, UploadError};
pub use upload::{
    FileStorage, IncomingFile, MetadataStore, Requester, UploadPolicy, UploadService,
    UploadedFileRecord,
};
pub use web::WebServer;
