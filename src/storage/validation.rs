//! Path validation
//!
//! Resolves tenant-supplied identifiers into absolute paths that are guaranteed
//! to stay under the storage root. Every operation that touches the filesystem
//! with a caller-supplied name goes through [`PathResolver`].

use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::StoreError;

/// Subdirectory of a tenant holding JSON documents
pub const DOCUMENT_DIR: &str = "document";
/// Subdirectory of a tenant holding image assets
pub const ASSET_DIR: &str = "asset";

pub const DEFAULT_MAX_TENANT_ID_LENGTH: usize = 50;
pub const DEFAULT_MAX_FILENAME_LENGTH: usize = 100;

/// Length of the `lg.json` / `sm.json` tail of a template pair filename
const PAIR_SUFFIX_LENGTH: usize = "lg.json".len();

/// Length limits applied to caller-supplied identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameLimits {
    pub max_tenant_id_length: usize,
    pub max_filename_length: usize,
}

impl Default for NameLimits {
    fn default() -> Self {
        Self {
            max_tenant_id_length: DEFAULT_MAX_TENANT_ID_LENGTH,
            max_filename_length: DEFAULT_MAX_FILENAME_LENGTH,
        }
    }
}

/// Resolves tenant-relative names against a sandboxed root
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
    limits: NameLimits,
}

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn is_filename_char(c: char) -> bool {
    is_id_char(c) || c == '.'
}

/// Strip a raw client filename down to `[A-Za-z0-9._-]`
pub fn sanitize_filename(raw: &str) -> String {
    raw.trim().chars().filter(|c| is_filename_char(*c)).collect()
}

/// Lowercased extension of a flat filename, if it has one
pub fn extension_of(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

impl PathResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_limits(root, NameLimits::default())
    }

    pub fn with_limits(root: impl Into<PathBuf>, limits: NameLimits) -> Self {
        Self {
            root: root.into(),
            limits,
        }
    }

    /// The configured (uncanonicalized) storage root
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn limits(&self) -> NameLimits {
        self.limits
    }

    /// Validate a tenant id (`[A-Za-z0-9_-]`, bounded length)
    pub fn validate_tenant_id(&self, tenant_id: &str) -> Result<(), StoreError> {
        if tenant_id.is_empty() || tenant_id.len() > self.limits.max_tenant_id_length {
            return Err(StoreError::InvalidPath(format!(
                "Store ID must be 1-{} characters",
                self.limits.max_tenant_id_length
            )));
        }
        if !tenant_id.chars().all(is_id_char) {
            return Err(StoreError::InvalidPath(format!(
                "Store ID must contain only alphanumeric characters, underscores, and hyphens: {}",
                tenant_id
            )));
        }
        Ok(())
    }

    /// Validate a single path segment (`[A-Za-z0-9._-]`, not `.` or `..`)
    pub fn validate_segment(&self, segment: &str) -> Result<(), StoreError> {
        if segment.is_empty() || segment.len() > self.limits.max_filename_length {
            return Err(StoreError::InvalidPath(format!(
                "Filename must be 1-{} characters",
                self.limits.max_filename_length
            )));
        }
        if segment == "." || segment == ".." {
            return Err(StoreError::InvalidPath(format!(
                "Relative segment not allowed: {}",
                segment
            )));
        }
        if !segment.chars().all(is_filename_char) {
            return Err(StoreError::InvalidPath(format!(
                "Filename contains invalid characters: {}",
                segment.escape_default()
            )));
        }
        Ok(())
    }

    /// Validate a template base name (`[A-Za-z0-9_-]`)
    ///
    /// Bounded by the tenant id limit, and short enough that `<base>lg.json`
    /// still fits the filename limit.
    pub fn validate_template_name(&self, name: &str) -> Result<(), StoreError> {
        let max = self
            .limits
            .max_tenant_id_length
            .min(self.limits.max_filename_length.saturating_sub(PAIR_SUFFIX_LENGTH));
        if name.is_empty() || name.len() > max {
            return Err(StoreError::InvalidPath(format!(
                "Template name must be 1-{} characters",
                max
            )));
        }
        if !name.chars().all(is_id_char) {
            return Err(StoreError::InvalidPath(format!(
                "Template name contains invalid characters: {}",
                name
            )));
        }
        Ok(())
    }

    /// Validate a document filename (flat, `.json` suffix)
    pub fn validate_document_name(&self, filename: &str) -> Result<(), StoreError> {
        self.validate_segment(filename)?;
        match filename.strip_suffix(".json") {
            Some(stem) if !stem.is_empty() => Ok(()),
            _ => Err(StoreError::InvalidPath(format!(
                "Filename must end with .json: {}",
                filename
            ))),
        }
    }

    /// Resolve `root/tenant_id/segments...` to an absolute path inside the root.
    ///
    /// The target does not need to exist. The longest existing ancestor is
    /// canonicalized (following symlinks) and must remain equal to or below the
    /// canonical root.
    pub fn resolve(&self, tenant_id: &str, segments: &[&str]) -> Result<PathBuf, StoreError> {
        self.validate_tenant_id(tenant_id)?;
        for segment in segments {
            self.validate_segment(segment)?;
        }

        let canonical_root = self.root.canonicalize().map_err(|e| {
            StoreError::InvalidPath(format!(
                "Storage root {} unavailable: {}",
                self.root.display(),
                e
            ))
        })?;

        let mut candidate = canonical_root.join(tenant_id);
        for segment in segments {
            candidate.push(segment);
        }

        let resolved = canonicalize_existing_prefix(&candidate).map_err(|e| {
            StoreError::InvalidPath(format!("Invalid path construction: {}", e))
        })?;

        if resolved != canonical_root && !resolved.starts_with(&canonical_root) {
            return Err(StoreError::InvalidPath(format!(
                "Path escapes storage root: {}/{}",
                tenant_id,
                segments.join("/")
            )));
        }

        Ok(resolved)
    }

    /// `root/tenant_id`
    pub fn tenant_dir(&self, tenant_id: &str) -> Result<PathBuf, StoreError> {
        self.resolve(tenant_id, &[])
    }

    /// `root/tenant_id/document`
    pub fn document_dir(&self, tenant_id: &str) -> Result<PathBuf, StoreError> {
        self.resolve(tenant_id, &[DOCUMENT_DIR])
    }

    /// `root/tenant_id/asset`
    pub fn asset_dir(&self, tenant_id: &str) -> Result<PathBuf, StoreError> {
        self.resolve(tenant_id, &[ASSET_DIR])
    }

    /// `root/tenant_id/document/filename`, filename must be a `.json` name
    pub fn document_path(&self, tenant_id: &str, filename: &str) -> Result<PathBuf, StoreError> {
        self.validate_document_name(filename)?;
        self.resolve(tenant_id, &[DOCUMENT_DIR, filename])
    }

    /// `root/tenant_id/asset/filename`
    pub fn asset_path(&self, tenant_id: &str, filename: &str) -> Result<PathBuf, StoreError> {
        self.resolve(tenant_id, &[ASSET_DIR, filename])
    }
}

/// Canonicalize the deepest existing ancestor of `path` and re-append the rest.
///
/// Missing components are plain names (validated by the caller), so they
/// cannot introduce `..` or symlinks of their own.
fn canonicalize_existing_prefix(path: &Path) -> io::Result<PathBuf> {
    let mut existing = path.to_path_buf();
    let mut missing = Vec::new();

    loop {
        match existing.canonicalize() {
            Ok(canonical) => {
                let mut resolved = canonical;
                for component in missing.iter().rev() {
                    resolved.push(component);
                }
                return Ok(resolved);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let name = match existing.components().next_back() {
                    Some(Component::Normal(name)) => name.to_os_string(),
                    _ => return Err(e),
                };
                missing.push(name);
                if !existing.pop() {
                    return Err(e);
                }
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_resolve_inside_root() {
        let dir = tempdir().expect("temp");
        let resolver = PathResolver::new(dir.path());
        let path = resolver
            .resolve("s1", &[DOCUMENT_DIR, "home.json"])
            .expect("resolve");
        let root = dir.path().canonicalize().expect("canonical root");
        assert_eq!(path, root.join("s1").join("document").join("home.json"));
    }

    #[test]
    fn test_rejects_traversal_segments() {
        let dir = tempdir().expect("temp");
        let resolver = PathResolver::new(dir.path());
        for bad in ["..", ".", "../etc", "/etc/passwd", "a/b", "a\\b", "", "a\0b"] {
            let err = resolver.resolve("s1", &[bad]).expect_err(bad);
            assert!(matches!(err, StoreError::InvalidPath(_)), "{bad}");
        }
    }

    #[test]
    fn test_rejects_bad_tenant_ids() {
        let dir = tempdir().expect("temp");
        let resolver = PathResolver::new(dir.path());
        let long = "a".repeat(51);
        for bad in ["", "..", "s.1", "s/1", "s 1", long.as_str()] {
            assert!(resolver.validate_tenant_id(bad).is_err(), "{bad}");
        }
        assert!(resolver.validate_tenant_id("store_1-a").is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_rejects_symlink_escape() {
        let dir = tempdir().expect("temp");
        let outside = tempdir().expect("outside");
        let root = dir.path().join("root");
        fs::create_dir_all(root.join("s1")).expect("tenant");
        std::os::unix::fs::symlink(outside.path(), root.join("s1").join("document"))
            .expect("symlink");

        let resolver = PathResolver::new(&root);
        let err = resolver
            .document_path("s1", "home.json")
            .expect_err("symlink escape");
        assert!(matches!(err, StoreError::InvalidPath(_)));
    }

    #[test]
    fn test_document_name_requires_json_suffix() {
        let dir = tempdir().expect("temp");
        let resolver = PathResolver::new(dir.path());
        assert!(resolver.document_path("s1", "home.json").is_ok());
        assert!(resolver.document_path("s1", "home.txt").is_err());
        assert!(resolver.document_path("s1", ".json").is_err());
    }

    #[test]
    fn test_sanitize_and_extension() {
        assert_eq!(sanitize_filename("  my photo!.PNG "), "myphoto.PNG");
        assert_eq!(sanitize_filename("../../x.png"), "....x.png");
        assert_eq!(extension_of("a.PNG"), Some("png".to_string()));
        assert_eq!(extension_of(".png"), None);
        assert_eq!(extension_of("png"), None);
    }

    #[test]
    fn test_template_name_rules() {
        let resolver = PathResolver::new("/srv/stores");
        assert!(resolver.validate_template_name("hero_1-a").is_ok());
        assert!(resolver.validate_template_name("hero.lg").is_err());
        assert!(resolver.validate_template_name("").is_err());
        assert!(resolver.validate_template_name(&"a".repeat(50)).is_ok());
        assert!(resolver.validate_template_name(&"a".repeat(51)).is_err());
    }

    #[test]
    fn test_template_name_follows_configured_limits() {
        let resolver = PathResolver::with_limits(
            "/srv/stores",
            NameLimits {
                max_tenant_id_length: 8,
                max_filename_length: 100,
            },
        );
        assert!(resolver.validate_template_name("abcdefgh").is_ok());
        assert!(resolver.validate_template_name("abcdefghi").is_err());

        // `<base>lg.json` must still fit the filename limit
        let resolver = PathResolver::with_limits(
            "/srv/stores",
            NameLimits {
                max_tenant_id_length: 50,
                max_filename_length: 12,
            },
        );
        assert!(resolver.validate_template_name("hello").is_ok());
        assert!(resolver.validate_template_name("hellos").is_err());
    }
}
