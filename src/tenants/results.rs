//! Tenant provisioning result types

use serde::Serialize;

/// Outcome of a provisioning call. `AlreadyExists` is a successful no-op.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProvisionOutcome {
    Created {
        tenant_id: String,
        url: String,
        copied: Vec<String>,
    },
    AlreadyExists {
        tenant_id: String,
        url: String,
    },
}

impl ProvisionOutcome {
    pub fn url(&self) -> &str {
        match self {
            ProvisionOutcome::Created { url, .. } | ProvisionOutcome::AlreadyExists { url, .. } => {
                url
            }
        }
    }

    pub fn message(&self) -> String {
        match self {
            ProvisionOutcome::Created { copied, .. } => {
                format!("Store initialized with {} template files", copied.len())
            }
            ProvisionOutcome::AlreadyExists { .. } => "Store already exists".to_string(),
        }
    }
}
