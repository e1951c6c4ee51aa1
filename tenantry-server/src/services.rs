//! Construction of the long-lived services from configuration

use anyhow::{Context, Result};
use std::sync::Arc;
use tenantry_config::TenantryConfig;
use tenantry_core::SecretCodec;
use tenantry_http::CollaboratorClient;
use tenantry_interfaces::TenantDirectory;
use tenantry_provisioning::{ConnectionRegistry, ProvisioningOrchestrator, ProvisioningSettings, TenantHealthService};
use tenantry_storage::{base_connection_config, DirectoryConnection, PostgresProbe, PostgresProvisioner, SeaOrmTenantDirectory};
use tracing::info;

use crate::context::AppContext;

pub struct ServiceContainer {
    pub directory: Arc<dyn TenantDirectory>,
    pub registry: Arc<ConnectionRegistry>,
    pub orchestrator: Arc<ProvisioningOrchestrator>,
    pub health: Arc<TenantHealthService>,
    internal_token: String,
}

impl ServiceContainer {
    pub async fn new(config: &TenantryConfig) -> Result<Self> {
        let connection = DirectoryConnection::new(config.directory.clone())
            .await
            .context("Failed to connect to the tenant directory")?;
        if config.directory.auto_migrate {
            connection
                .migrate()
                .await
                .context("Failed to migrate the tenant directory")?;
        }
        let directory: Arc<dyn TenantDirectory> = Arc::new(SeaOrmTenantDirectory::new(connection));

        let codec = SecretCodec::from_secret(&config.security.secret_key);
        let registry = Arc::new(ConnectionRegistry::new(
            base_connection_config(&config.admin),
            directory.clone(),
            codec.clone(),
        ));

        let provisioner = Arc::new(PostgresProvisioner::connect_lazy(&config.admin)?);
        let remote = Arc::new(CollaboratorClient::new(
            &config.collaborator,
            config.security.internal_token.clone(),
        )?);

        let settings = ProvisioningSettings {
            tenant_host: config.admin.effective_tenant_host().to_string(),
            tenant_port: config.admin.effective_tenant_port(),
        };
        info!(
            tenant_host = %settings.tenant_host,
            tenant_port = settings.tenant_port,
            collaborator = %config.collaborator.base_url,
            "Provisioning services configured"
        );

        let orchestrator = Arc::new(ProvisioningOrchestrator::new(
            directory.clone(),
            provisioner,
            remote,
            registry.clone(),
            codec,
            settings,
        ));
        let health = Arc::new(TenantHealthService::new(registry.clone(), Arc::new(PostgresProbe::new())));

        Ok(Self {
            directory,
            registry,
            orchestrator,
            health,
            internal_token: config.security.internal_token.clone(),
        })
    }

    pub fn app_context(&self) -> AppContext {
        AppContext::new(self.orchestrator.clone(), self.health.clone(), self.internal_token.as_str())
    }
}
