//! Web layer for the upload service.
//!
//! Serves the upload form, accepts documents at `POST /upload` and serves
//! stored files back under `/uploads`.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;
