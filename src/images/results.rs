//! Image result types

use serde::Serialize;
use std::path::PathBuf;

/// Result of a promoted upload
#[derive(Debug, Clone, Serialize)]
pub struct IngestResult {
    pub tenant_id: String,
    pub filename: String,
    pub stored_path: PathBuf,
    /// `<tenant>/asset/<filename>`
    pub relative_path: String,
    pub size_bytes: u64,
    /// Format detected by the decoder, e.g. `png`
    pub format: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageList {
    pub tenant_id: String,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageDeletion {
    pub tenant_id: String,
    pub filename: String,
}
