//! Template pair operations
//!
//! A template pair is `<base>lg.json` plus `<base>sm.json` in a tenant's
//! document directory. Both exist or neither does: creation rolls back the
//! first file when the second write fails.
//!
//! The existence check in [`create_pair`] is not atomic with the writes that
//! follow. Two concurrent creations of the same base name can both pass the
//! check, and the later writer wins. Callers needing strict exclusivity must
//! serialize on `(tenant, base)` themselves.

use log::{error, info, warn};
use serde::Serialize;
use serde_json::{Value, json};
use std::io;
use std::path::PathBuf;

use crate::error::StoreError;
use crate::storage::filesystem::{directory_exists, file_exists, remove_file_with_retries};
use crate::storage::{PathResolver, write_atomic};
use crate::templates::results::{PairCreation, PairDeletion};

pub const LARGE_SUFFIX: &str = "lg";
pub const SMALL_SUFFIX: &str = "sm";

/// `[<base>lg.json, <base>sm.json]`
pub fn pair_filenames(base_name: &str) -> [String; 2] {
    [
        format!("{}{}.json", base_name, LARGE_SUFFIX),
        format!("{}{}.json", base_name, SMALL_SUFFIX),
    ]
}

/// Content written to both halves when the caller supplies none
pub fn default_pair_content(base_name: &str) -> Value {
    json!({
        "children": {
            "type": base_name,
            "metaData": {
                "title": base_name,
                "description": format!("{} page", base_name)
            },
            "sections": [],
            "order": []
        }
    })
}

fn pair_paths(
    resolver: &PathResolver,
    tenant_id: &str,
    base_name: &str,
) -> Result<Vec<(String, PathBuf)>, StoreError> {
    resolver.validate_tenant_id(tenant_id)?;
    resolver.validate_template_name(base_name)?;

    if !directory_exists(&resolver.document_dir(tenant_id)?) {
        return Err(StoreError::TenantNotFound(tenant_id.to_string()));
    }

    pair_filenames(base_name)
        .into_iter()
        .map(|name| {
            let path = resolver.document_path(tenant_id, &name)?;
            Ok((name, path))
        })
        .collect()
}

fn into_io_error(err: StoreError) -> io::Error {
    match err {
        StoreError::Io(e) => e,
        other => io::Error::other(other.to_string()),
    }
}

/// Creates both halves of a pair, or neither
pub fn create_pair<T: Serialize + ?Sized>(
    resolver: &PathResolver,
    tenant_id: &str,
    base_name: &str,
    content: &T,
) -> Result<PairCreation, StoreError> {
    let targets = pair_paths(resolver, tenant_id, base_name)?;

    let existing: Vec<String> = targets
        .iter()
        .filter(|(_, path)| file_exists(path))
        .map(|(name, _)| name.clone())
        .collect();
    if !existing.is_empty() {
        warn!(
            "Template files already exist for store {}: {:?}",
            tenant_id, existing
        );
        return Err(StoreError::Conflict(existing));
    }

    let bytes = serde_json::to_vec_pretty(content)?;

    let mut created: Vec<(String, PathBuf)> = Vec::with_capacity(targets.len());
    for (name, path) in targets {
        if let Err(e) = write_atomic(&path, &bytes) {
            if created.is_empty() {
                return Err(e);
            }

            error!(
                "Failed to write {} for store {}, rolling back: {}",
                name, tenant_id, e
            );
            for (created_name, created_path) in &created {
                if let Err(rollback_err) = remove_file_with_retries(created_path) {
                    error!(
                        "Rollback of {} for store {} failed: {}",
                        created_name, tenant_id, rollback_err
                    );
                }
            }
            return Err(StoreError::PartialFailure {
                completed: created.into_iter().map(|(name, _)| name).collect(),
                source: into_io_error(e),
            });
        }
        created.push((name, path));
    }

    let created: Vec<String> = created.into_iter().map(|(name, _)| name).collect();
    info!(
        "Created template pair for store {}: {:?}",
        tenant_id, created
    );

    Ok(PairCreation {
        tenant_id: tenant_id.to_string(),
        created,
    })
}

/// Deletes whichever halves of a pair exist
pub fn delete_pair(
    resolver: &PathResolver,
    tenant_id: &str,
    base_name: &str,
) -> Result<PairDeletion, StoreError> {
    let targets = pair_paths(resolver, tenant_id, base_name)?;

    let mut deleted = Vec::new();
    let mut missing = Vec::new();

    for (name, path) in targets {
        if !file_exists(&path) {
            missing.push(name);
            continue;
        }
        match remove_file_with_retries(&path) {
            Ok(()) => {
                info!("Deleted {} for store {}", name, tenant_id);
                deleted.push(name);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => missing.push(name),
            Err(e) => {
                error!("Failed to delete {} for store {}: {}", name, tenant_id, e);
                return Err(StoreError::Io(e));
            }
        }
    }

    if deleted.is_empty() {
        return Err(StoreError::NotFound(format!(
            "No template files found to delete for '{}'",
            base_name
        )));
    }

    Ok(PairDeletion {
        tenant_id: tenant_id.to_string(),
        deleted,
        missing,
    })
}
