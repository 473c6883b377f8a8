//! Metadata record describing one stored upload.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// URL prefix under which stored files are served.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

/// Optional identification sent along with a file. Not validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Requester {
    /// Name given in the form.
    pub name: Option<String>,
    /// Email given in the form.
    pub email: Option<String>,
}

impl Requester {
    /// Build from raw form values; empty strings count as absent.
    pub fn from_form(name: Option<String>, email: Option<String>) -> Self {
        Self {
            name: name.filter(|s| !s.is_empty()),
            email: email.filter(|s| !s.is_empty()),
        }
    }
}

/// One entry of the metadata log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFileRecord {
    /// Filename as sent by the client.
    pub original_name: String,
    /// Generated name of the file on disk.
    pub stored_name: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Declared MIME type.
    pub mime_type: String,
    /// Path the file is served from.
    pub url: String,
    /// When the upload was accepted.
    #[serde(with = "crate::datetime::iso8601")]
    pub uploaded_at: DateTime<Utc>,
    /// Requester name from the form, `null` when not given.
    pub requester_name: Option<String>,
    /// Requester email from the form, `null` when not given.
    pub requester_email: Option<String>,
}

impl UploadedFileRecord {
    /// Create a record stamped with the current time.
    ///
    /// The timestamp is cut to milliseconds, the precision it is stored with.
    pub fn new(
        original_name: impl Into<String>,
        stored_name: impl Into<String>,
        size_bytes: u64,
        mime_type: impl Into<String>,
        requester: Requester,
    ) -> Self {
        let stored_name = stored_name.into();
        Self {
            original_name: original_name.into(),
            url: format!("{UPLOADS_URL_PREFIX}/{stored_name}"),
            stored_name,
            size_bytes,
            mime_type: mime_type.into(),
            uploaded_at: Utc::now().trunc_subsecs(3),
            requester_name: requester.name,
            requester_email: requester.email,
        }
    }
}
