//! Credential lookup and liveness checks for provisioned tenants

use serde::Serialize;
use std::sync::Arc;
use tenantry_core::{CredentialBundle, TenantryError};
use tenantry_interfaces::ConnectionProbe;
use tracing::{debug, warn};

use crate::registry::ConnectionRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Unhealthy,
}

/// Result of a tenant liveness check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub tenant_slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_name: Option<String>,
    pub status: HealthState,
    /// Value returned by the liveness query
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_result: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == HealthState::Healthy
    }

    fn unhealthy(tenant_slug: &str, connection_name: Option<String>, error: impl ToString) -> Self {
        Self {
            tenant_slug: tenant_slug.to_string(),
            connection_name,
            status: HealthState::Unhealthy,
            test_result: None,
            error: Some(error.to_string()),
        }
    }
}

pub struct TenantHealthService {
    registry: Arc<ConnectionRegistry>,
    probe: Arc<dyn ConnectionProbe>,
}

impl TenantHealthService {
    pub fn new(registry: Arc<ConnectionRegistry>, probe: Arc<dyn ConnectionProbe>) -> Self {
        Self { registry, probe }
    }

    /// Decrypted credentials of an active tenant
    pub async fn credentials(&self, tenant_slug: &str) -> Result<CredentialBundle, TenantryError> {
        self.registry.credential_bundle(tenant_slug).await
    }

    /// Register the tenant connection if needed and run the liveness query.
    ///
    /// Never fails: every problem is reported as an unhealthy result.
    pub async fn check(&self, tenant_slug: &str) -> HealthReport {
        let connection_name = match self.registry.get_or_register_on_demand(tenant_slug).await {
            Ok(name) => name,
            Err(e) => {
                warn!(tenant_slug, "Health check could not register connection: {}", e);
                return HealthReport::unhealthy(tenant_slug, None, e);
            }
        };

        // Registered a moment ago unless shutdown raced us
        let Some(config) = self.registry.get(&connection_name).await else {
            return HealthReport::unhealthy(tenant_slug, Some(connection_name), "connection is not registered");
        };

        match self.probe.ping(&config).await {
            Ok(result) => {
                debug!(tenant_slug, connection_name = %connection_name, "Tenant database healthy");
                HealthReport {
                    tenant_slug: tenant_slug.to_string(),
                    connection_name: Some(connection_name),
                    status: HealthState::Healthy,
                    test_result: Some(result),
                    error: None,
                }
            }
            Err(e) => {
                warn!(tenant_slug, connection_name = %connection_name, "Tenant database unhealthy: {}", e);
                HealthReport::unhealthy(tenant_slug, Some(connection_name), e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_new_tenant, InMemoryTenantDirectory, MockProbe};
    use tenantry_core::{ConnectionConfig, SecretCodec, TenantStatus};
    use tenantry_interfaces::{ProbeError, TenantDirectory};

    async fn service(probe: MockProbe) -> (Arc<ConnectionRegistry>, TenantHealthService) {
        let directory = Arc::new(InMemoryTenantDirectory::new());
        let codec = SecretCodec::from_secret("health-secret");

        let mut tenant = sample_new_tenant("acme");
        tenant.status = TenantStatus::Active;
        tenant.database_password_encrypted = codec.encrypt("hunter2hunter2hu").unwrap();
        directory.create(tenant).await.unwrap();

        let registry = Arc::new(ConnectionRegistry::new(ConnectionConfig::default(), directory, codec));
        (registry.clone(), TenantHealthService::new(registry, Arc::new(probe)))
    }

    #[tokio::test]
    async fn test_healthy_tenant() {
        let mut probe = MockProbe::new();
        probe
            .expect_ping()
            .withf(|config| config.database == "acme_compliance_db" && config.password == "hunter2hunter2hu")
            .times(1)
            .returning(|_| Ok(1));
        let (registry, service) = service(probe).await;

        let report = service.check("acme").await;

        assert!(report.is_healthy());
        assert_eq!(report.test_result, Some(1));
        assert_eq!(report.connection_name.as_deref(), Some("acme_compliance_db"));
        assert!(registry.contains("acme_compliance_db").await);
    }

    #[tokio::test]
    async fn test_probe_failure_is_unhealthy() {
        let mut probe = MockProbe::new();
        probe
            .expect_ping()
            .returning(|_| Err(ProbeError::Connection("connection refused".to_string())));
        let (_, service) = service(probe).await;

        let report = service.check("acme").await;

        assert_eq!(report.status, HealthState::Unhealthy);
        assert!(report.error.unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_unknown_tenant_is_unhealthy() {
        let mut probe = MockProbe::new();
        probe.expect_ping().never();
        let (_, service) = service(probe).await;

        let report = service.check("ghost").await;

        assert!(!report.is_healthy());
        assert!(report.connection_name.is_none());
        assert_eq!(
            serde_json::to_value(&report).unwrap()["status"],
            serde_json::json!("unhealthy")
        );
    }

    #[tokio::test]
    async fn test_credentials_lookup() {
        let (_, service) = service(MockProbe::new()).await;

        let bundle = service.credentials("acme").await.unwrap();
        assert_eq!(bundle.database_password, "hunter2hunter2hu");

        let err = service.credentials("ghost").await.unwrap_err();
        assert!(matches!(err, TenantryError::TenantNotFound(_)));
    }
}
