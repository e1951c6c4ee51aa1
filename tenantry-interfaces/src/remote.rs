//! Collaborating service interface

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tenantry_core::RemoteCallFailure;

fn default_success() -> bool {
    true
}

/// Body returned by a successful template distribution call.
///
/// Unknown fields are kept in `extra` so callers can pass them through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateDistribution {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub frameworks_copied: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TemplateDistribution {
    /// Result reported when the collaborating service answered with an empty
    /// object
    pub fn empty() -> Self {
        Self {
            success: false,
            frameworks_copied: 0,
            extra: Map::new(),
        }
    }
}

/// Remote operations performed by the collaborating service.
///
/// Failures come back as values: a non-200 status, a timeout or a transport
/// error is a [`RemoteCallFailure`], never a panic or a fatal error.
#[async_trait]
pub trait RemoteOrchestrator: Send + Sync {
    /// Ask the collaborator to migrate the tenant schema
    async fn run_migrations(
        &self,
        tenant_slug: &str,
        connection_name: &str,
    ) -> Result<(), RemoteCallFailure>;

    /// Ask the collaborator to copy framework templates into the tenant.
    /// `None` means every framework.
    async fn seed_templates(
        &self,
        tenant_slug: &str,
        framework_ids: Option<Vec<i64>>,
    ) -> Result<TemplateDistribution, RemoteCallFailure>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distribution_defaults() {
        let parsed: TemplateDistribution = serde_json::from_str(r#"{"frameworks_copied": 4}"#).unwrap();
        assert!(parsed.success);
        assert_eq!(parsed.frameworks_copied, 4);
        assert!(parsed.extra.is_empty());
    }

    #[test]
    fn test_distribution_keeps_unknown_fields() {
        let parsed: TemplateDistribution =
            serde_json::from_str(r#"{"success": false, "frameworks_copied": 0, "errors": ["x"]}"#).unwrap();
        assert!(!parsed.success);
        assert_eq!(parsed.extra.get("errors"), Some(&serde_json::json!(["x"])));
    }
}
