//! Configuration module for the upload service.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::{Result, UploadError};

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Upload storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    /// Directory that receives uploaded files.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    /// Metadata log file name, relative to `upload_dir`.
    #[serde(default = "default_metadata_file")]
    pub metadata_file: String,
    /// Maximum upload size in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
    /// Accepted MIME types.
    #[serde(default = "default_allowed_mime_types")]
    pub allowed_mime_types: Vec<String>,
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

fn default_metadata_file() -> String {
    "metadata.json".to_string()
}

fn default_max_upload_size() -> u64 {
    8
}

fn default_allowed_mime_types() -> Vec<String> {
    [
        "application/pdf",
        "image/jpeg",
        "image/png",
        "application/msword",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl FilesConfig {
    /// Maximum upload size in bytes.
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_size_mb * 1024 * 1024
    }

    /// Full path of the metadata log.
    pub fn metadata_path(&self) -> PathBuf {
        Path::new(&self.upload_dir).join(&self.metadata_file)
    }
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            metadata_file: default_metadata_file(),
            max_upload_size_mb: default_max_upload_size(),
            allowed_mime_types: default_allowed_mime_types(),
        }
    }
}

/// Web front configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// HTML form served at `/`.
    #[serde(default = "default_index_path")]
    pub index_path: String,
}

fn default_index_path() -> String {
    "public/form.html".to_string()
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            index_path: default_index_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional log file; console only when unset.
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Upload storage configuration.
    #[serde(default)]
    pub files: FilesConfig,
    /// Web front configuration.
    #[serde(default)]
    pub web: WebConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(UploadError::Io)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| UploadError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `PORT`: Override the listening port
    ///
    /// An unparsable value leaves the configuration unchanged and is
    /// returned as an error for the caller to report.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse::<u16>()
                .map_err(|e| UploadError::Config(format!("invalid PORT value {port:?}: {e}")))?;
        }
        Ok(())
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - The upload size limit is zero
    /// - The MIME allow-list is empty
    pub fn validate(&self) -> Result<()> {
        if self.files.max_upload_size_mb == 0 {
            return Err(UploadError::Config(
                "files.max_upload_size_mb must be greater than zero".to_string(),
            ));
        }
        if self.files.allowed_mime_types.is_empty() {
            return Err(UploadError::Config(
                "files.allowed_mime_types must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
