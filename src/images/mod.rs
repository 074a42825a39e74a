//! Images module
//!
//! Validated ingestion, listing and removal of tenant image assets.

pub mod ingest;
mod operations;
pub mod results;

use crate::storage::validation::extension_of;

pub use ingest::{IngestStage, ingest_image};
pub use operations::{delete_image, list_images};
pub use results::{ImageDeletion, ImageList, IngestResult};

/// Every extension a deployment may enable
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "webp", "jpg", "jpeg", "gif"];

/// Extensions enabled when nothing is configured
pub const DEFAULT_EXTENSIONS: &[&str] = &["png", "webp"];

/// The set of image extensions a deployment accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePolicy {
    extensions: Vec<String>,
}

impl ImagePolicy {
    /// Build a policy, ignoring anything outside [`SUPPORTED_EXTENSIONS`]
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut allowed: Vec<String> = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
            .collect();
        allowed.sort();
        allowed.dedup();
        Self {
            extensions: allowed,
        }
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Whether `filename` carries an enabled extension (case-insensitive)
    pub fn allows(&self, filename: &str) -> bool {
        extension_of(filename)
            .map(|ext| self.extensions.iter().any(|allowed| *allowed == ext))
            .unwrap_or(false)
    }
}

impl Default for ImagePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_filters_unknown_extensions() {
        let policy = ImagePolicy::new([".PNG", "bmp", "jpg", "png"]);
        assert_eq!(policy.extensions(), &["jpg".to_string(), "png".to_string()]);
    }

    #[test]
    fn test_policy_allows() {
        let policy = ImagePolicy::default();
        assert!(policy.allows("a.png"));
        assert!(policy.allows("a.WEBP"));
        assert!(!policy.allows("a.jpg"));
        assert!(!policy.allows("png"));
        assert!(!policy.allows("a.png.exe"));
    }
}
