//! Tenant directory interface

use async_trait::async_trait;
use tenantry_core::{NewTenant, TenantRecord, TenantStatus, TenantryError};

/// Tenant directory error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectoryError {
    #[error("Tenant with slug '{slug}' already exists")]
    DuplicateSlug { slug: String },

    #[error("Tenant not found: {slug}")]
    NotFound { slug: String },

    #[error("Connection error: {message}")]
    Connection { message: String },

    #[error("Internal directory error: {message}")]
    Internal { message: String },
}

impl From<DirectoryError> for TenantryError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::DuplicateSlug { slug } => TenantryError::DuplicateSlug(slug),
            DirectoryError::NotFound { slug } => TenantryError::TenantNotFound(slug),
            other => TenantryError::Directory(other.to_string()),
        }
    }
}

/// Persisted record of every tenant's provisioning state.
///
/// Implementations must enforce slug uniqueness atomically across all
/// records, including soft-deleted ones: of several concurrent `create`
/// calls for one slug exactly one succeeds and the rest get
/// [`DirectoryError::DuplicateSlug`].
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    /// Insert a new record. `created_at` and `updated_at` are set here.
    async fn create(&self, tenant: NewTenant) -> Result<TenantRecord, DirectoryError>;

    /// Look a tenant up by its normalized slug
    async fn get_by_slug(
        &self,
        tenant_slug: &str,
        active_only: bool,
    ) -> Result<Option<TenantRecord>, DirectoryError>;

    /// Set a new status, always bumping `updated_at`
    async fn update_status(
        &self,
        record: &TenantRecord,
        status: TenantStatus,
    ) -> Result<TenantRecord, DirectoryError>;

    /// Every record with `is_active = true`, oldest first
    async fn list_active(&self) -> Result<Vec<TenantRecord>, DirectoryError>;

    /// Number of records (active or not) holding the slug
    async fn count_by_slug(&self, tenant_slug: &str) -> Result<u64, DirectoryError>;

    /// Check the backing store can serve requests
    async fn health_check(&self) -> Result<(), DirectoryError>;
}
