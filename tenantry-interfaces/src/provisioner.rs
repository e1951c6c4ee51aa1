//! Physical database provisioning interface

use async_trait::async_trait;
use tenantry_core::{DatabaseCredentials, ProvisioningError};

/// Reconciles a tenant's role and database in the administrative data store.
///
/// `ensure` must be safe to call repeatedly with the same names: an existing
/// role gets its password reset, an existing database gets its owner
/// corrected, and privileges are granted again. Nothing is dropped.
#[async_trait]
pub trait DatabaseProvisioner: Send + Sync {
    async fn ensure(&self, credentials: &DatabaseCredentials) -> Result<(), ProvisioningError>;
}
