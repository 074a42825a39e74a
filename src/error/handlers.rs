//! Error handlers
//!
//! Maps store errors onto the status codes the request layer reports.

use crate::error::types::{ErrorKind, StoreError};
use log::{error, warn};

/// Log a store error at a level matching its severity
pub fn handle_error(err: &StoreError) {
    match err.kind() {
        ErrorKind::Io | ErrorKind::PartialFailure => error!("Content store error: {}", err),
        _ => warn!("Request rejected: {}", err),
    }
}

/// Convert error to HTTP status code
pub fn status_code(err: &StoreError) -> u16 {
    match err.kind() {
        ErrorKind::InvalidPath => 400,
        ErrorKind::InvalidContent => 400,
        ErrorKind::Serialization => 400,
        ErrorKind::UnsupportedType => 400,
        ErrorKind::InvalidImage => 400,
        ErrorKind::NotFound => 404,
        ErrorKind::TenantNotFound => 404,
        ErrorKind::Conflict => 409,
        ErrorKind::PayloadTooLarge => 413,
        ErrorKind::PartialFailure => 500,
        ErrorKind::Io => 500,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_status_codes() {
        assert_eq!(status_code(&StoreError::InvalidPath("..".into())), 400);
        assert_eq!(status_code(&StoreError::NotFound("a.json".into())), 404);
        assert_eq!(status_code(&StoreError::Conflict(vec![])), 409);
        assert_eq!(status_code(&StoreError::PayloadTooLarge { limit: 1 }), 413);
        assert_eq!(
            status_code(&StoreError::Io(io::Error::new(io::ErrorKind::Other, "x"))),
            500
        );
    }
}
