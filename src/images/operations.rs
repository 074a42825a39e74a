//! Image listing and deletion

use log::info;

use crate::error::StoreError;
use crate::images::ImagePolicy;
use crate::images::results::{ImageDeletion, ImageList};
use crate::storage::filesystem::{
    directory_exists, file_exists, list_file_names, remove_file_with_retries,
};
use crate::storage::{ASSET_DIR, PathResolver};

/// Lists the image assets of a tenant that carry an enabled extension
pub fn list_images(
    resolver: &PathResolver,
    policy: &ImagePolicy,
    tenant_id: &str,
) -> Result<ImageList, StoreError> {
    if !directory_exists(&resolver.tenant_dir(tenant_id)?) {
        return Err(StoreError::TenantNotFound(tenant_id.to_string()));
    }

    let dir = resolver.asset_dir(tenant_id)?;
    let images = if directory_exists(&dir) {
        list_file_names(&dir, |name| policy.allows(name))?
    } else {
        Vec::new()
    };

    info!("Listed {} images for store {}", images.len(), tenant_id);

    Ok(ImageList {
        tenant_id: tenant_id.to_string(),
        images,
    })
}

/// Removes one image asset
pub fn delete_image(
    resolver: &PathResolver,
    policy: &ImagePolicy,
    tenant_id: &str,
    filename: &str,
) -> Result<ImageDeletion, StoreError> {
    resolver.validate_tenant_id(tenant_id)?;
    resolver.validate_segment(filename)?;
    if !policy.allows(filename) {
        return Err(StoreError::UnsupportedType(filename.to_string()));
    }

    let path = resolver.asset_path(tenant_id, filename)?;
    if !path.exists() {
        return Err(StoreError::NotFound(format!(
            "{}/{}/{}",
            tenant_id, ASSET_DIR, filename
        )));
    }
    if !file_exists(&path) {
        return Err(StoreError::InvalidPath(format!("Path is not a file: {}", filename)));
    }

    remove_file_with_retries(&path)?;

    info!("Deleted image {} for store {}", filename, tenant_id);

    Ok(ImageDeletion {
        tenant_id: tenant_id.to_string(),
        filename: filename.to_string(),
    })
}
