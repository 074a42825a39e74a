//! RAX content store
//!
//! Filesystem layer of a multi-tenant content service: per-tenant JSON
//! documents, validated image assets and paired page templates, all kept
//! under a single sandboxed storage root.

pub mod commands;
pub mod config;
pub mod documents;
pub mod error;
pub mod images;
pub mod maintenance;
pub mod service;
pub mod storage;
pub mod templates;
pub mod tenants;
pub mod utils;

pub use config::StoreConfig;
pub use error::StoreError;
pub use service::ContentStore;
