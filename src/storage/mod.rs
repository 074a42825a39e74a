//! File system storage management
//!
//! Handles path containment, atomic writes and shared file helpers.

pub mod atomic;
pub mod filesystem;
pub mod validation;

// Re-export commonly used items
pub use atomic::{AtomicFile, TEMP_SUFFIX, write_atomic};
pub use validation::{ASSET_DIR, DOCUMENT_DIR, NameLimits, PathResolver, sanitize_filename};
