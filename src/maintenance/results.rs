use serde::Serialize;
use std::path::PathBuf;

/// Temp files removed by a sweep, and those that could not be removed
#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepReport {
    pub removed: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}
