//! Tenants module
//!
//! Creates a tenant's directory tree from the template root.

mod operations;
pub mod results;

pub use operations::{copy_templates, provision};
pub use results::ProvisionOutcome;
