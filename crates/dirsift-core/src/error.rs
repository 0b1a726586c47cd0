//! Error types for scanning operations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fatal errors: the scan produced no tree.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Root path does not exist.
    #[error("Directory not found: {path}")]
    NotFound { path: PathBuf },

    /// Permission denied for the root path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Root path is not a directory.
    #[error("Root path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Generic I/O error on the root path.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The scan was cancelled before it finished.
    #[error("Operation interrupted")]
    Interrupted,

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl ScanError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Whether the error means the root could not be found or opened.
    pub fn is_root_unavailable(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::PermissionDenied { .. } | Self::NotADirectory { .. } | Self::Io { .. }
        )
    }
}

/// Kind of scan warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// A directory below the root could not be listed.
    DirectoryAccess,
    /// A single directory entry could not be read.
    Entry,
    /// File metadata could not be read; the file was skipped.
    Metadata,
    /// File content could not be read; the file has no digest.
    Hash,
}

/// Non-fatal warning encountered during scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl ScanWarning {
    /// Create a new scan warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Create a directory access warning.
    pub fn directory_access(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        let path = path.into();
        Self {
            message: format!("Cannot read directory {}: {error}", path.display()),
            path,
            kind: WarningKind::DirectoryAccess,
        }
    }

    /// Create a metadata warning.
    pub fn metadata(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        let path = path.into();
        Self {
            message: format!("Cannot read metadata: {error}"),
            path,
            kind: WarningKind::Metadata,
        }
    }

    /// Create a hashing warning.
    pub fn hash(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        let path = path.into();
        Self {
            message: format!("Cannot hash file: {error}"),
            path,
            kind: WarningKind::Hash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_error_io() {
        let err = ScanError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, ScanError::PermissionDenied { .. }));
        assert!(err.is_root_unavailable());

        let err = ScanError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(matches!(err, ScanError::NotFound { .. }));
        assert!(err.to_string().contains("Directory not found"));
    }

    #[test]
    fn test_interrupted_is_not_root_error() {
        assert!(!ScanError::Interrupted.is_root_unavailable());
    }

    #[test]
    fn test_scan_warning_creation() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let warning = ScanWarning::directory_access("/test/path", &io);
        assert_eq!(warning.kind, WarningKind::DirectoryAccess);
        assert!(warning.message.contains("/test/path"));

        let warning = ScanWarning::hash("/test/file", &io);
        assert_eq!(warning.kind, WarningKind::Hash);
    }
}
