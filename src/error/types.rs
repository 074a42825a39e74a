//! Error types
//!
//! Defines the error taxonomy returned by every content store operation.

use std::fmt;
use std::io;

/// Fieldless discriminant of [`StoreError`], for callers that only branch on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidPath,
    NotFound,
    TenantNotFound,
    InvalidContent,
    Serialization,
    UnsupportedType,
    PayloadTooLarge,
    InvalidImage,
    Conflict,
    PartialFailure,
    Io,
}

/// Content store errors
#[derive(Debug)]
pub enum StoreError {
    /// Identifier is malformed or the resolved path escapes the storage root.
    InvalidPath(String),
    /// The named document or asset does not exist.
    NotFound(String),
    TenantNotFound(String),
    /// Document is empty or not parseable JSON.
    InvalidContent(String),
    Serialization(String),
    UnsupportedType(String),
    PayloadTooLarge { limit: u64 },
    InvalidImage(String),
    Conflict(Vec<String>),
    /// A multi-file operation failed part way; `completed` lists what was rolled back.
    PartialFailure { completed: Vec<String>, source: io::Error },
    Io(io::Error),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::InvalidPath(_) => ErrorKind::InvalidPath,
            StoreError::NotFound(_) => ErrorKind::NotFound,
            StoreError::TenantNotFound(_) => ErrorKind::TenantNotFound,
            StoreError::InvalidContent(_) => ErrorKind::InvalidContent,
            StoreError::Serialization(_) => ErrorKind::Serialization,
            StoreError::UnsupportedType(_) => ErrorKind::UnsupportedType,
            StoreError::PayloadTooLarge { .. } => ErrorKind::PayloadTooLarge,
            StoreError::InvalidImage(_) => ErrorKind::InvalidImage,
            StoreError::Conflict(_) => ErrorKind::Conflict,
            StoreError::PartialFailure { .. } => ErrorKind::PartialFailure,
            StoreError::Io(_) => ErrorKind::Io,
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::InvalidPath(p) => write!(f, "Invalid path: {}", p),
            StoreError::NotFound(p) => write!(f, "Not found: {}", p),
            StoreError::TenantNotFound(t) => write!(f, "Store '{}' does not exist", t),
            StoreError::InvalidContent(msg) => write!(f, "Invalid content: {}", msg),
            StoreError::Serialization(msg) => write!(f, "Data is not JSON serializable: {}", msg),
            StoreError::UnsupportedType(name) => write!(f, "Unsupported file type: {}", name),
            StoreError::PayloadTooLarge { limit } => {
                write!(f, "Payload too large (max {} bytes)", limit)
            }
            StoreError::InvalidImage(msg) => write!(f, "Invalid image: {}", msg),
            StoreError::Conflict(names) => write!(f, "Already exists: {}", names.join(", ")),
            StoreError::PartialFailure { completed, source } => write!(
                f,
                "Operation failed after partial progress (rolled back: {}): {}",
                completed.join(", "),
                source
            ),
            StoreError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::PartialFailure { source, .. } => Some(source),
            StoreError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(error: io::Error) -> Self {
        StoreError::Io(error)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(error: serde_json::Error) -> Self {
        StoreError::Serialization(error.to_string())
    }
}
