//! Configuration management for the RAX content store
//!
//! Separates startup configuration (requires restart) from runtime configuration
//! (can be updated while the store is serving requests).

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::images::SUPPORTED_EXTENSIONS;
use crate::storage::validation::{
    DEFAULT_MAX_FILENAME_LENGTH, DEFAULT_MAX_TENANT_ID_LENGTH, NameLimits,
};

/// Complete store configuration with startup/runtime separation
#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(flatten)]
    pub startup: StartupConfig,

    #[serde(flatten)]
    pub runtime: RuntimeConfig,
}

/// Configuration that requires a restart to take effect
#[derive(Debug, Deserialize, Clone)]
pub struct StartupConfig {
    // ═══ FILESYSTEM LAYOUT (Environment Override Supported) ═══
    /// Root directory holding one subdirectory per tenant
    pub storage_root: String,

    /// Read-only directory of JSON documents copied into new tenants
    pub template_root: String,

    /// Base URL under which provisioned tenants are served
    pub public_url: String,

    // ═══ INTERNAL BEHAVIOR ═══
    /// Image extensions accepted for upload
    pub allowed_image_extensions: Vec<String>,

    /// Security limits
    pub max_tenant_id_length: usize,
    pub max_filename_length: usize,

    /// Age after which a leftover `*.tmp` file is considered abandoned
    pub stale_temp_secs: u64,
}

/// Configuration that can be updated at runtime
#[derive(Debug, Deserialize, Clone)]
pub struct RuntimeConfig {
    /// Maximum image upload size in MB
    /// Environment: RAX_STORE_MAX_UPLOAD_MB
    pub max_upload_mb: u64,
}

/// Thread-safe runtime configuration wrapper
pub type SharedRuntimeConfig = Arc<RwLock<RuntimeConfig>>;

const DEFAULT_MAX_UPLOAD_MB: u64 = 16;
/// Upper bound accepted for `max_upload_mb`
pub const MAX_UPLOAD_MB: u64 = 4096;
const DEFAULT_STALE_TEMP_SECS: u64 = 3600;

impl StoreConfig {
    /// Load configuration from config.toml with environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        // Packaged layout first, then the working directory
        let config_paths = ["rax-content-store/config", "config"];

        let mut last_error = None;

        for config_path in &config_paths {
            match Self::load_from(config_path) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    last_error = Some(e);
                    continue;
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            config::ConfigError::Message(format!(
                "Failed to load config.toml from any location. Tried: {config_paths:?}"
            ))
        }))
    }

    /// Load configuration from a single file (extension optional) plus environment overrides
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::load_with(config_path, environment())
    }

    fn load_with(config_path: &str, env: Environment) -> Result<Self, config::ConfigError> {
        let settings = Config::builder()
            .set_default("public_url", "http://localhost")?
            .set_default("allowed_image_extensions", vec!["png", "webp"])?
            .set_default("max_tenant_id_length", DEFAULT_MAX_TENANT_ID_LENGTH as i64)?
            .set_default("max_filename_length", DEFAULT_MAX_FILENAME_LENGTH as i64)?
            .set_default("stale_temp_secs", DEFAULT_STALE_TEMP_SECS as i64)?
            .set_default("max_upload_mb", DEFAULT_MAX_UPLOAD_MB as i64)?
            .add_source(File::with_name(config_path))
            .add_source(env)
            .build()?;

        let config: StoreConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Build a configuration in code, using defaults for everything but the two roots
    pub fn for_roots(storage_root: impl AsRef<Path>, template_root: impl AsRef<Path>) -> Self {
        Self {
            startup: StartupConfig {
                storage_root: storage_root.as_ref().to_string_lossy().into_owned(),
                template_root: template_root.as_ref().to_string_lossy().into_owned(),
                public_url: "http://localhost".to_string(),
                allowed_image_extensions: vec!["png".to_string(), "webp".to_string()],
                max_tenant_id_length: DEFAULT_MAX_TENANT_ID_LENGTH,
                max_filename_length: DEFAULT_MAX_FILENAME_LENGTH,
                stale_temp_secs: DEFAULT_STALE_TEMP_SECS,
            },
            runtime: RuntimeConfig {
                max_upload_mb: DEFAULT_MAX_UPLOAD_MB,
            },
        }
    }

    /// Split into startup (immutable) and runtime (mutable) parts
    pub fn split(self) -> (StartupConfig, SharedRuntimeConfig) {
        let runtime = Arc::new(RwLock::new(self.runtime));
        (self.startup, runtime)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.startup.storage_root.is_empty() {
            return Err(config::ConfigError::Message(
                "storage_root cannot be empty".into(),
            ));
        }

        if self.startup.template_root.is_empty() {
            return Err(config::ConfigError::Message(
                "template_root cannot be empty".into(),
            ));
        }

        if self.startup.allowed_image_extensions.is_empty() {
            return Err(config::ConfigError::Message(
                "allowed_image_extensions cannot be empty".into(),
            ));
        }

        for ext in &self.startup.allowed_image_extensions {
            if !SUPPORTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) {
                return Err(config::ConfigError::Message(format!(
                    "Unsupported image extension '{ext}' (expected one of {SUPPORTED_EXTENSIONS:?})"
                )));
            }
        }

        if self.startup.max_tenant_id_length == 0 || self.startup.max_filename_length == 0 {
            return Err(config::ConfigError::Message(
                "identifier length limits must be greater than 0".into(),
            ));
        }

        if self.runtime.max_upload_mb == 0 || self.runtime.max_upload_mb > MAX_UPLOAD_MB {
            return Err(config::ConfigError::Message(format!(
                "max_upload_mb must be between 1 and {MAX_UPLOAD_MB}"
            )));
        }

        Ok(())
    }
}

/// `RAX_STORE_*` overrides; `RAX_STORE_ALLOWED_IMAGE_EXTENSIONS` takes a comma-separated list
fn environment() -> Environment {
    Environment::with_prefix("RAX_STORE")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("allowed_image_extensions")
}

impl StartupConfig {
    /// Get storage root as PathBuf
    pub fn storage_root_path(&self) -> PathBuf {
        PathBuf::from(&self.storage_root)
    }

    /// Get template root as PathBuf
    pub fn template_root_path(&self) -> PathBuf {
        PathBuf::from(&self.template_root)
    }

    /// Public URL of a tenant
    pub fn tenant_url(&self, tenant_id: &str) -> String {
        format!("{}/{}", self.public_url.trim_end_matches('/'), tenant_id)
    }

    /// Identifier length limits for the path resolver
    pub fn name_limits(&self) -> NameLimits {
        NameLimits {
            max_tenant_id_length: self.max_tenant_id_length,
            max_filename_length: self.max_filename_length,
        }
    }

    /// Get stale temp threshold as Duration
    pub fn stale_temp_age(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.stale_temp_secs)
    }
}

impl RuntimeConfig {
    /// Get maximum upload size in bytes
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_from_file_applies_defaults() {
        let dir = tempdir().expect("temp");
        let path = dir.path().join("store.toml");
        fs::write(
            &path,
            "storage_root = \"/srv/stores\"\ntemplate_root = \"/srv/templates\"\npublic_url = \"https://cdn.example.com/\"\n",
        )
        .expect("write config");

        let config = StoreConfig::load_from(path.to_str().expect("utf8")).expect("load");
        assert_eq!(config.startup.storage_root, "/srv/stores");
        assert_eq!(config.startup.allowed_image_extensions, vec!["png", "webp"]);
        assert_eq!(config.runtime.max_upload_bytes(), 16 * 1024 * 1024);
        assert_eq!(
            config.startup.tenant_url("s1"),
            "https://cdn.example.com/s1"
        );
    }

    #[test]
    fn test_environment_overrides_lists_and_numbers() {
        let dir = tempdir().expect("temp");
        let path = dir.path().join("store.toml");
        fs::write(
            &path,
            "storage_root = \"/srv/stores\"\ntemplate_root = \"/srv/templates\"\n",
        )
        .expect("write config");

        let vars: config::Map<String, String> = [
            ("RAX_STORE_ALLOWED_IMAGE_EXTENSIONS", "png,gif"),
            ("RAX_STORE_MAX_UPLOAD_MB", "32"),
            ("RAX_STORE_STORAGE_ROOT", "/data/stores"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let config = StoreConfig::load_with(
            path.to_str().expect("utf8"),
            environment().source(Some(vars)),
        )
        .expect("load");
        assert_eq!(config.startup.allowed_image_extensions, vec!["png", "gif"]);
        assert_eq!(config.startup.storage_root, "/data/stores");
        assert_eq!(config.runtime.max_upload_mb, 32);
    }

    #[test]
    fn test_rejects_unknown_extension() {
        let mut config = StoreConfig::for_roots("/srv/stores", "/srv/templates");
        config.startup.allowed_image_extensions = vec!["bmp".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_out_of_range_upload_limit() {
        let mut config = StoreConfig::for_roots("/srv/stores", "/srv/templates");
        config.runtime.max_upload_mb = 0;
        assert!(config.validate().is_err());
        config.runtime.max_upload_mb = MAX_UPLOAD_MB + 1;
        assert!(config.validate().is_err());
        config.runtime.max_upload_mb = MAX_UPLOAD_MB;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_upload_bytes_saturate() {
        let runtime = RuntimeConfig {
            max_upload_mb: u64::MAX / 1024,
        };
        assert_eq!(runtime.max_upload_bytes(), u64::MAX);
    }
}
