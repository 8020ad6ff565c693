//! Error types for faena.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias using faena's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for faena operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Row-store operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Client not found
    #[error("Client not found: {0}")]
    ClientNotFound(Uuid),

    /// Work not found
    #[error("Work not found: {0}")]
    WorkNotFound(Uuid),

    /// No stored object at the given attachment path
    #[error("Attachment not found: {0}")]
    AttachmentNotFound(String),

    /// Required field missing/empty, caught before any backend call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Attachment upload rejected by the underlying transport
    #[error("Upload error: {0}")]
    Upload(String),

    /// Best-effort attachment cleanup failed; logged and swallowed by the
    /// repositories, never aborts the primary row operation
    #[error("Attachment cleanup failed: {0}")]
    AttachmentCleanup(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_client_not_found() {
        let id = Uuid::nil();
        let err = Error::ClientNotFound(id);
        assert_eq!(err.to_string(), format!("Client not found: {}", id));
    }

    #[test]
    fn test_error_display_work_not_found() {
        let id = Uuid::new_v4();
        let err = Error::WorkNotFound(id);
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn test_error_display_validation() {
        let err = Error::Validation("name is required".to_string());
        assert_eq!(err.to_string(), "Validation error: name is required");
    }

    #[test]
    fn test_error_display_attachment_not_found() {
        let err = Error::AttachmentNotFound("missing.pdf".to_string());
        assert_eq!(err.to_string(), "Attachment not found: missing.pdf");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        match err {
            Error::Io(_) => {}
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
