//! Document operations
//!
//! Read, update and list JSON documents under `<root>/<tenant>/document/`.
//! Documents are only created by provisioning and template flows; updates
//! require the target to exist already.

use log::{debug, info, warn};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io;

use crate::documents::results::{DocumentList, DocumentUpdate};
use crate::error::StoreError;
use crate::storage::filesystem::{directory_exists, file_exists, list_file_names};
use crate::storage::{DOCUMENT_DIR, PathResolver, write_atomic};

fn display_path(tenant_id: &str, filename: &str) -> String {
    format!("{}/{}/{}", tenant_id, DOCUMENT_DIR, filename)
}

/// Lists the `*.json` documents of a tenant
pub fn list_documents(resolver: &PathResolver, tenant_id: &str) -> Result<DocumentList, StoreError> {
    let dir = resolver.document_dir(tenant_id)?;
    if !directory_exists(&dir) {
        return Err(StoreError::TenantNotFound(tenant_id.to_string()));
    }

    let files = list_file_names(&dir, |name| name.ends_with(".json"))?;

    info!("Listed {} JSON files for store {}", files.len(), tenant_id);

    Ok(DocumentList {
        tenant_id: tenant_id.to_string(),
        files,
    })
}

/// Reads and parses a document
pub fn read_document(
    resolver: &PathResolver,
    tenant_id: &str,
    filename: &str,
) -> Result<Value, StoreError> {
    let path = resolver.document_path(tenant_id, filename)?;
    if !file_exists(&path) {
        return Err(StoreError::NotFound(display_path(tenant_id, filename)));
    }

    let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => StoreError::NotFound(display_path(tenant_id, filename)),
        io::ErrorKind::InvalidData => {
            StoreError::InvalidContent(format!("{} is not valid UTF-8", filename))
        }
        _ => StoreError::Io(e),
    })?;

    let trimmed = content.trim();
    if trimmed.is_empty() {
        warn!("Document {} is empty", display_path(tenant_id, filename));
        return Err(StoreError::InvalidContent(format!("{} is empty", filename)));
    }

    let value = serde_json::from_str(trimmed)
        .map_err(|e| StoreError::InvalidContent(format!("Invalid JSON format: {}", e)))?;

    debug!("Read document {}", display_path(tenant_id, filename));
    Ok(value)
}

/// Replaces an existing document with the JSON encoding of `value`
pub fn update_document<T: Serialize + ?Sized>(
    resolver: &PathResolver,
    tenant_id: &str,
    filename: &str,
    value: &T,
) -> Result<DocumentUpdate, StoreError> {
    let path = resolver.document_path(tenant_id, filename)?;
    if !file_exists(&path) {
        return Err(StoreError::NotFound(display_path(tenant_id, filename)));
    }

    // Encode before touching the filesystem so a bad value never opens a temp file
    let bytes = serde_json::to_vec_pretty(value)?;
    write_atomic(&path, &bytes)?;

    info!(
        "Updated document {} ({} bytes)",
        display_path(tenant_id, filename),
        bytes.len()
    );

    Ok(DocumentUpdate {
        filename: filename.to_string(),
        size_bytes: bytes.len() as u64,
    })
}
