//! Maintenance module
//!
//! Reclaims temp files left behind when an upload or write was abandoned
//! mid-stream. Nothing in the request path calls this; operators run it
//! periodically.

mod operations;
pub mod results;

pub use operations::sweep_stale_temp_files;
pub use results::SweepReport;
