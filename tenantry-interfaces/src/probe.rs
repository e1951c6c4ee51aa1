//! Tenant database liveness probe

use async_trait::async_trait;
use tenantry_core::ConnectionConfig;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Liveness query failed: {0}")]
    Query(String),
}

/// Runs a trivial query (`SELECT 1`) against a tenant database
#[async_trait]
pub trait ConnectionProbe: Send + Sync {
    async fn ping(&self, config: &ConnectionConfig) -> Result<i32, ProbeError>;
}
