//! Middleware for Web API.

pub mod security;

pub use security::security_headers;
