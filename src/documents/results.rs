//! Document result types
//!
//! Defines result structures returned by document operations.

use serde::Serialize;

/// Result of a document listing
#[derive(Debug, Clone, Serialize)]
pub struct DocumentList {
    pub tenant_id: String,
    pub files: Vec<String>,
}

/// Result of a document update
#[derive(Debug, Clone, Serialize)]
pub struct DocumentUpdate {
    pub filename: String,
    pub size_bytes: u64,
}
