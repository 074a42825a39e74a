//! Template pair result types

use serde::Serialize;

/// Result of creating a pair
#[derive(Debug, Clone, Serialize)]
pub struct PairCreation {
    pub tenant_id: String,
    pub created: Vec<String>,
}

/// Result of deleting a pair; `missing` lists halves that were already gone
#[derive(Debug, Clone, Serialize)]
pub struct PairDeletion {
    pub tenant_id: String,
    pub deleted: Vec<String>,
    pub missing: Vec<String>,
}
