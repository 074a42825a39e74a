//! Tenant provisioning
//!
//! A tenant counts as provisioned once its `document/` directory exists.
//! Template copies are plain byte copies: the directory is brand new and not
//! yet served, so nobody can observe a half-copied file.

use log::{error, info, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::storage::PathResolver;
use crate::storage::filesystem::{create_directory, directory_exists, list_file_names};
use crate::tenants::results::ProvisionOutcome;

/// Directories a provisioning call created, for cleanup on failure
struct CreatedDirs {
    tenant: Option<PathBuf>,
    children: Vec<PathBuf>,
}

impl CreatedDirs {
    fn remove(&self) {
        let targets: Vec<&PathBuf> = match &self.tenant {
            Some(tenant) => vec![tenant],
            None => self.children.iter().collect(),
        };
        for dir in targets {
            if let Err(e) = fs::remove_dir_all(dir) {
                error!("Failed to clean up {}: {}", dir.display(), e);
            }
        }
    }
}

/// Copy every regular `*.json` file of `template_root` into `dest`
pub fn copy_templates(template_root: &Path, dest: &Path) -> io::Result<Vec<String>> {
    let names = list_file_names(template_root, |name| name.ends_with(".json"))?;
    for name in &names {
        fs::copy(template_root.join(name), dest.join(name))?;
    }
    Ok(names)
}

/// Create `document/` and `asset/` for a tenant and seed its documents
pub fn provision(
    resolver: &PathResolver,
    template_root: &Path,
    url: String,
    tenant_id: &str,
) -> Result<ProvisionOutcome, StoreError> {
    let tenant_dir = resolver.tenant_dir(tenant_id)?;
    let document_dir = resolver.document_dir(tenant_id)?;
    let asset_dir = resolver.asset_dir(tenant_id)?;

    if directory_exists(&document_dir) {
        info!("Store {} already provisioned", tenant_id);
        return Ok(ProvisionOutcome::AlreadyExists {
            tenant_id: tenant_id.to_string(),
            url,
        });
    }

    let created = CreatedDirs {
        tenant: (!tenant_dir.exists()).then(|| tenant_dir.clone()),
        children: [&document_dir, &asset_dir]
            .into_iter()
            .filter(|dir| !dir.exists())
            .cloned()
            .collect(),
    };

    let seeded = create_directory(&document_dir)
        .and_then(|_| create_directory(&asset_dir))
        .and_then(|_| copy_templates(template_root, &document_dir));

    match seeded {
        Ok(copied) => {
            info!(
                "Store {} initialized with {} template files",
                tenant_id,
                copied.len()
            );
            Ok(ProvisionOutcome::Created {
                tenant_id: tenant_id.to_string(),
                url,
                copied,
            })
        }
        Err(e) => {
            warn!("Failed to initialize store {}: {}", tenant_id, e);
            created.remove();
            Err(StoreError::Io(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{ASSET_DIR, DOCUMENT_DIR};
    use tempfile::tempdir;

    fn template_dir() -> tempfile::TempDir {
        let dir = tempdir().expect("templates");
        fs::write(dir.path().join("home.json"), br#"{"page":"home"}"#).expect("home");
        fs::write(dir.path().join("about.json"), br#"{"page":"about"}"#).expect("about");
        fs::write(dir.path().join("README.md"), b"not a template").expect("readme");
        fs::create_dir(dir.path().join("nested.json")).expect("nested");
        dir
    }

    #[test]
    fn test_provision_creates_layout() {
        let root = tempdir().expect("root");
        let templates = template_dir();
        let resolver = PathResolver::new(root.path());

        let outcome = provision(&resolver, templates.path(), "https://cdn/s1".into(), "s1")
            .expect("provision");
        match outcome {
            ProvisionOutcome::Created { url, copied, .. } => {
                assert_eq!(url, "https://cdn/s1");
                assert_eq!(copied, vec!["about.json", "home.json"]);
            }
            other => panic!("unexpected {other:?}"),
        }

        let tenant = root.path().join("s1");
        assert!(tenant.join(ASSET_DIR).is_dir());
        assert_eq!(
            fs::read(tenant.join(DOCUMENT_DIR).join("home.json")).expect("copy"),
            br#"{"page":"home"}"#
        );
        assert!(!tenant.join(DOCUMENT_DIR).join("README.md").exists());
    }

    #[test]
    fn test_provision_is_idempotent() {
        let root = tempdir().expect("root");
        let templates = template_dir();
        let resolver = PathResolver::new(root.path());

        provision(&resolver, templates.path(), "u".into(), "s1").expect("first");
        let home = root.path().join("s1").join(DOCUMENT_DIR).join("home.json");
        fs::write(&home, b"{\"edited\":true}").expect("edit");

        let outcome = provision(&resolver, templates.path(), "u".into(), "s1").expect("second");
        assert!(matches!(outcome, ProvisionOutcome::AlreadyExists { .. }));
        assert_eq!(fs::read(&home).expect("home"), b"{\"edited\":true}");
    }

    #[test]
    fn test_failed_copy_removes_created_dirs() {
        let root = tempdir().expect("root");
        let resolver = PathResolver::new(root.path());
        let missing = root.path().join("no-templates");

        let err = provision(&resolver, &missing, "u".into(), "s1").expect_err("no templates");
        assert!(matches!(err, StoreError::Io(_)));
        assert!(!root.path().join("s1").exists());
    }

    #[test]
    fn test_failed_copy_keeps_preexisting_tenant_dir() {
        let root = tempdir().expect("root");
        let resolver = PathResolver::new(root.path());
        let assets = root.path().join("s1").join(ASSET_DIR);
        fs::create_dir_all(&assets).expect("assets");
        fs::write(assets.join("logo.png"), b"x").expect("logo");

        let missing = root.path().join("no-templates");
        provision(&resolver, &missing, "u".into(), "s1").expect_err("no templates");

        assert!(assets.join("logo.png").is_file());
        assert!(!root.path().join("s1").join(DOCUMENT_DIR).exists());
    }

    #[test]
    fn test_provision_rejects_bad_tenant() {
        let root = tempdir().expect("root");
        let templates = template_dir();
        let resolver = PathResolver::new(root.path());

        let err = provision(&resolver, templates.path(), "u".into(), "../s1").expect_err("bad");
        assert!(matches!(err, StoreError::InvalidPath(_)));
    }
}
