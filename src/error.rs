//! Error taxonomy
//!
//! Storage failures come from the durable store, viewer failures from the external
//! viewer. A missing document is reported as [`ViewerError::NoDocumentLoaded`] but the
//! autosave path treats it as a no-op, not a failure.

use thiserror::Error;

/// Failures of the browser storage backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Engine missing, blocked, or the transaction failed
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage quota exceeded")]
    QuotaExceeded,

    /// A record exists but holds a value of the wrong type
    #[error("stored record `{0}` is malformed")]
    Malformed(&'static str),
}

impl StorageError {
    /// Classify a `DOMException` raised by the storage engine
    pub fn from_exception(name: &str, message: &str) -> Self {
        match name {
            // Older Firefox reports quota failures under its own name
            "QuotaExceededError" | "NS_ERROR_DOM_QUOTA_REACHED" => StorageError::QuotaExceeded,
            _ => StorageError::Unavailable(format!("{}: {}", name, message)),
        }
    }
}

/// Failures reported by the external viewer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewerError {
    #[error("no document is loaded")]
    NoDocumentLoaded,

    /// Overlay export or import rejected by the viewer
    #[error("annotation overlay rejected: {0}")]
    Serialization(String),

    #[error("document load failed: {0}")]
    Load(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Viewer(#[from] ViewerError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exception_classification() {
        assert_eq!(
            StorageError::from_exception("QuotaExceededError", "disk full"),
            StorageError::QuotaExceeded
        );
        assert_eq!(
            StorageError::from_exception("NS_ERROR_DOM_QUOTA_REACHED", ""),
            StorageError::QuotaExceeded
        );
        assert_eq!(
            StorageError::from_exception("InvalidStateError", "database closed"),
            StorageError::Unavailable("InvalidStateError: database closed".to_string())
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            StorageError::QuotaExceeded.to_string(),
            "storage quota exceeded"
        );
        assert_eq!(
            Error::from(StorageError::Malformed("saved-pdf")).to_string(),
            "stored record `saved-pdf` is malformed"
        );
        assert_eq!(
            Error::from(ViewerError::NoDocumentLoaded).to_string(),
            "no document is loaded"
        );
    }
}
