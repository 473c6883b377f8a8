//! Upload acceptance rules.
//!
//! Validation here is pure: it looks at the declared MIME type and the
//! byte count and never touches the filesystem, so it can run before any
//! side effect of an upload.

use mime::Mime;

use crate::config::FilesConfig;
use crate::UploadError;

/// Reason an upload was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The declared MIME type is not in the allow-list.
    DisallowedType(String),
    /// The file exceeds the maximum size.
    TooLarge {
        /// Observed size in bytes.
        size: u64,
        /// Maximum allowed size in bytes.
        max: u64,
    },
}

impl From<Rejection> for UploadError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::DisallowedType(mime) => UploadError::Validation(mime),
            Rejection::TooLarge { max, .. } => UploadError::SizeLimit {
                max_mb: max / 1024 / 1024,
            },
        }
    }
}

/// Reduce a declared content type to its lowercase `type/subtype` essence.
///
/// Parameters such as `; name=a.pdf` are dropped. A value that does not
/// parse as a MIME type is returned trimmed and otherwise untouched, so it
/// still fails the allow-list.
pub fn mime_essence(content_type: &str) -> String {
    match content_type.trim().parse::<Mime>() {
        Ok(mime) => mime.essence_str().to_string(),
        Err(_) => content_type.trim().to_string(),
    }
}

/// Allow-list and size limit applied to every upload.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    allowed_mime_types: Vec<String>,
    max_bytes: u64,
}

impl UploadPolicy {
    /// Create a policy from an allow-list and a byte limit.
    pub fn new(allowed_mime_types: Vec<String>, max_bytes: u64) -> Self {
        Self {
            allowed_mime_types,
            max_bytes,
        }
    }

    /// Build the policy described by the `[files]` configuration section.
    pub fn from_config(config: &FilesConfig) -> Self {
        Self::new(config.allowed_mime_types.clone(), config.max_upload_bytes())
    }

    /// Maximum accepted size in bytes.
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Accepted MIME types.
    pub fn allowed_mime_types(&self) -> &[String] {
        &self.allowed_mime_types
    }

    /// Check a MIME essence against the allow-list (exact match).
    ///
    /// Callers holding a raw `Content-Type` value pass it through
    /// [`mime_essence`] first.
    pub fn check_mime(&self, mime_type: &str) -> Result<(), Rejection> {
        if self.allowed_mime_types.iter().any(|m| m == mime_type) {
            Ok(())
        } else {
            Err(Rejection::DisallowedType(mime_type.to_string()))
        }
    }

    /// Check a byte count against the size limit. A file of exactly the limit is accepted.
    pub fn check_size(&self, size: u64) -> Result<(), Rejection> {
        if size > self.max_bytes {
            Err(Rejection::TooLarge {
                size,
                max: self.max_bytes,
            })
        } else {
            Ok(())
        }
    }

    /// Run every check; the type is checked first.
    pub fn validate(&self, mime_type: &str, size: u64) -> Result<(), Rejection> {
        self.check_mime(mime_type)?;
        self.check_size(size)
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::from_config(&FilesConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: u64 = 1024 * 1024;

    #[test]
    fn test_default_allow_list() {
        let policy = UploadPolicy::default();

        assert!(policy.check_mime("application/pdf").is_ok());
        assert!(policy.check_mime("image/jpeg").is_ok());
        assert!(policy.check_mime("image/png").is_ok());
        assert!(policy.check_mime("application/msword").is_ok());
        assert!(policy
            .check_mime("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
            .is_ok());
    }

    #[test]
    fn test_disallowed_types() {
        let policy = UploadPolicy::default();

        for mime in ["text/html", "image/gif", "application/octet-stream", ""] {
            assert_eq!(
                policy.check_mime(mime),
                Err(Rejection::DisallowedType(mime.to_string()))
            );
        }
    }

    #[test]
    fn test_mime_essence() {
        assert_eq!(mime_essence("application/pdf"), "application/pdf");
        assert_eq!(mime_essence("application/pdf; name=a.pdf"), "application/pdf");
        assert_eq!(mime_essence("Application/PDF"), "application/pdf");
        assert_eq!(mime_essence("image/png;charset=binary"), "image/png");
        assert_eq!(mime_essence("not a mime"), "not a mime");
        assert_eq!(mime_essence(""), "");
    }

    #[test]
    fn test_essence_passes_allow_list() {
        let policy = UploadPolicy::default();

        assert!(policy
            .check_mime(&mime_essence("application/pdf; name=a.pdf"))
            .is_ok());
        assert!(policy.check_mime(&mime_essence("IMAGE/PNG")).is_ok());
        assert!(policy
            .check_mime(&mime_essence("text/html; charset=utf-8"))
            .is_err());
    }

    #[test]
    fn test_size_limit_boundary() {
        let policy = UploadPolicy::default();

        assert_eq!(policy.max_bytes(), 8 * MIB);
        assert!(policy.check_size(0).is_ok());
        assert!(policy.check_size(8 * MIB).is_ok());
        assert_eq!(
            policy.check_size(8 * MIB + 1),
            Err(Rejection::TooLarge {
                size: 8 * MIB + 1,
                max: 8 * MIB
            })
        );
    }

    #[test]
    fn test_validate_checks_type_first() {
        let policy = UploadPolicy::default();

        let result = policy.validate("text/plain", 9 * MIB);
        assert!(matches!(result, Err(Rejection::DisallowedType(_))));

        let result = policy.validate("application/pdf", 9 * MIB);
        assert!(matches!(result, Err(Rejection::TooLarge { .. })));

        assert!(policy.validate("application/pdf", 2 * MIB).is_ok());
    }

    #[test]
    fn test_rejection_into_upload_error() {
        let err: UploadError = Rejection::TooLarge {
            size: 9 * MIB,
            max: 8 * MIB,
        }
        .into();
        assert_eq!(err.to_string(), "File too large (max 8MB)");

        let err: UploadError = Rejection::DisallowedType("text/html".into()).into();
        assert_eq!(err.to_string(), "Tipo de archivo no permitido");
    }

    #[test]
    fn test_custom_policy() {
        let policy = UploadPolicy::new(vec!["text/csv".to_string()], 10);

        assert!(policy.validate("text/csv", 10).is_ok());
        assert!(policy.validate("application/pdf", 1).is_err());
        assert_eq!(policy.allowed_mime_types(), &["text/csv".to_string()]);
    }
}
