//! Shared state handed to every handler

use std::sync::Arc;
use tenantry_interfaces::TenantDirectory;
use tenantry_provisioning::{ConnectionRegistry, ProvisioningOrchestrator, TenantHealthService};

#[derive(Clone)]
pub struct AppContext {
    pub orchestrator: Arc<ProvisioningOrchestrator>,
    pub health: Arc<TenantHealthService>,
    pub directory: Arc<dyn TenantDirectory>,
    pub registry: Arc<ConnectionRegistry>,
    /// Expected `X-Internal-Token` value on internal routes
    pub internal_token: Arc<str>,
}

impl AppContext {
    pub fn new(
        orchestrator: Arc<ProvisioningOrchestrator>,
        health: Arc<TenantHealthService>,
        internal_token: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            directory: orchestrator.directory().clone(),
            registry: orchestrator.registry().clone(),
            orchestrator,
            health,
            internal_token: internal_token.into(),
        }
    }
}
