//! Documents module
//!
//! JSON documents owned by a tenant.

mod operations;
pub mod results;

// Re-export public types and functions
pub use operations::{list_documents, read_document, update_document};
pub use results::{DocumentList, DocumentUpdate};
