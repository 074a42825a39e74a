//! Async entry point to the content store
//!
//! [`ContentStore`] owns the resolver and configuration and exposes every
//! storage operation as an `async fn`. The filesystem work itself is blocking
//! and runs on tokio's blocking pool.

use log::{info, warn};
use serde_json::Value;
use std::io::{self, Read};
use std::sync::Arc;

use crate::config::{MAX_UPLOAD_MB, SharedRuntimeConfig, StartupConfig, StoreConfig};
use crate::documents::{self, DocumentList, DocumentUpdate};
use crate::error::StoreError;
use crate::images::{self, ImageDeletion, ImageList, ImagePolicy, IngestResult};
use crate::maintenance::{self, SweepReport};
use crate::storage::PathResolver;
use crate::storage::filesystem::create_directory;
use crate::templates::{self, PairCreation, PairDeletion};
use crate::tenants::{self, ProvisionOutcome};

pub struct ContentStore {
    startup: Arc<StartupConfig>,
    runtime: SharedRuntimeConfig,
    resolver: Arc<PathResolver>,
    policy: Arc<ImagePolicy>,
}

impl ContentStore {
    /// Build a store, creating the storage root if it does not exist yet
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        let (startup, runtime) = config.split();

        let root = startup.storage_root_path();
        create_directory(&root)?;
        info!("Storage root directory: {}", root.display());

        let resolver = PathResolver::with_limits(root, startup.name_limits());
        let policy = ImagePolicy::new(&startup.allowed_image_extensions);
        info!("Accepted image extensions: {:?}", policy.extensions());

        Ok(Self {
            startup: Arc::new(startup),
            runtime,
            resolver: Arc::new(resolver),
            policy: Arc::new(policy),
        })
    }

    /// Current upload cap in bytes
    pub async fn max_upload_bytes(&self) -> u64 {
        self.runtime.read().await.max_upload_bytes()
    }

    /// Change the upload cap without a restart
    pub async fn set_max_upload_mb(&self, max_upload_mb: u64) {
        if max_upload_mb == 0 || max_upload_mb > MAX_UPLOAD_MB {
            warn!(
                "Ignoring max_upload_mb of {} (expected 1-{})",
                max_upload_mb, MAX_UPLOAD_MB
            );
            return;
        }
        self.runtime.write().await.max_upload_mb = max_upload_mb;
        info!("Upload limit set to {} MB", max_upload_mb);
    }

    async fn run_blocking<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(&PathResolver, &ImagePolicy) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let resolver = Arc::clone(&self.resolver);
        let policy = Arc::clone(&self.policy);

        tokio::task::spawn_blocking(move || op(&resolver, &policy))
            .await
            .map_err(|e| StoreError::Io(io::Error::other(e)))?
    }

    pub async fn provision(&self, tenant_id: &str) -> Result<ProvisionOutcome, StoreError> {
        let tenant_id = tenant_id.to_string();
        let url = self.startup.tenant_url(&tenant_id);
        let template_root = self.startup.template_root_path();

        self.run_blocking(move |resolver, _| {
            tenants::provision(resolver, &template_root, url, &tenant_id)
        })
        .await
    }

    pub async fn list_documents(&self, tenant_id: &str) -> Result<DocumentList, StoreError> {
        let tenant_id = tenant_id.to_string();
        self.run_blocking(move |resolver, _| documents::list_documents(resolver, &tenant_id))
            .await
    }

    pub async fn read_document(&self, tenant_id: &str, filename: &str) -> Result<Value, StoreError> {
        let (tenant_id, filename) = (tenant_id.to_string(), filename.to_string());
        self.run_blocking(move |resolver, _| {
            documents::read_document(resolver, &tenant_id, &filename)
        })
        .await
    }

    pub async fn update_document(
        &self,
        tenant_id: &str,
        filename: &str,
        value: Value,
    ) -> Result<DocumentUpdate, StoreError> {
        let (tenant_id, filename) = (tenant_id.to_string(), filename.to_string());
        self.run_blocking(move |resolver, _| {
            documents::update_document(resolver, &tenant_id, &filename, &value)
        })
        .await
    }

    /// Ingest an image from any byte source, capped at the current upload limit
    pub async fn upload_image<R>(
        &self,
        tenant_id: &str,
        filename: &str,
        reader: R,
    ) -> Result<IngestResult, StoreError>
    where
        R: Read + Send + 'static,
    {
        let (tenant_id, filename) = (tenant_id.to_string(), filename.to_string());
        let max_bytes = self.max_upload_bytes().await;

        self.run_blocking(move |resolver, policy| {
            images::ingest_image(resolver, policy, &tenant_id, &filename, reader, max_bytes)
        })
        .await
    }

    pub async fn list_images(&self, tenant_id: &str) -> Result<ImageList, StoreError> {
        let tenant_id = tenant_id.to_string();
        self.run_blocking(move |resolver, policy| {
            images::list_images(resolver, policy, &tenant_id)
        })
        .await
    }

    pub async fn delete_image(
        &self,
        tenant_id: &str,
        filename: &str,
    ) -> Result<ImageDeletion, StoreError> {
        let (tenant_id, filename) = (tenant_id.to_string(), filename.to_string());
        self.run_blocking(move |resolver, policy| {
            images::delete_image(resolver, policy, &tenant_id, &filename)
        })
        .await
    }

    /// Create a template pair; `None` writes the default page skeleton
    pub async fn create_pair(
        &self,
        tenant_id: &str,
        base_name: &str,
        content: Option<Value>,
    ) -> Result<PairCreation, StoreError> {
        let (tenant_id, base_name) = (tenant_id.to_string(), base_name.to_string());
        self.run_blocking(move |resolver, _| {
            let content = content.unwrap_or_else(|| templates::default_pair_content(&base_name));
            templates::create_pair(resolver, &tenant_id, &base_name, &content)
        })
        .await
    }

    pub async fn delete_pair(
        &self,
        tenant_id: &str,
        base_name: &str,
    ) -> Result<PairDeletion, StoreError> {
        let (tenant_id, base_name) = (tenant_id.to_string(), base_name.to_string());
        self.run_blocking(move |resolver, _| {
            templates::delete_pair(resolver, &tenant_id, &base_name)
        })
        .await
    }

    /// Remove abandoned temp files older than the configured threshold
    pub async fn sweep_temp_files(&self) -> Result<SweepReport, StoreError> {
        let older_than = self.startup.stale_temp_age();
        self.run_blocking(move |resolver, _| {
            let report = maintenance::sweep_stale_temp_files(resolver.root(), older_than)?;
            Ok(report)
        })
        .await
    }
}
