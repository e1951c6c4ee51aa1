//! Test doubles for the provisioning seams

use async_trait::async_trait;
use chrono::{Duration, Utc};
use mockall::mock;
use std::sync::atomic::{AtomicBool, Ordering};
use tenantry_core::{
    ConnectionConfig, DatabaseCredentials, NewTenant, ProvisioningError, RemoteCallFailure, SubscriptionPlan,
    TenantRecord, TenantStatus,
};
use tenantry_interfaces::{
    ConnectionProbe, DatabaseProvisioner, DirectoryError, ProbeError, RemoteOrchestrator, TemplateDistribution,
    TenantDirectory,
};
use tokio::sync::Mutex;
use uuid::Uuid;

mock! {
    pub Provisioner {}

    #[async_trait]
    impl DatabaseProvisioner for Provisioner {
        async fn ensure(&self, credentials: &DatabaseCredentials) -> Result<(), ProvisioningError>;
    }
}

mock! {
    pub Remote {}

    #[async_trait]
    impl RemoteOrchestrator for Remote {
        async fn run_migrations(&self, tenant_slug: &str, connection_name: &str) -> Result<(), RemoteCallFailure>;

        async fn seed_templates(
            &self,
            tenant_slug: &str,
            framework_ids: Option<Vec<i64>>,
        ) -> Result<TemplateDistribution, RemoteCallFailure>;
    }
}

mock! {
    pub Probe {}

    #[async_trait]
    impl ConnectionProbe for Probe {
        async fn ping(&self, config: &ConnectionConfig) -> Result<i32, ProbeError>;
    }
}

/// `NewTenant` with derived names, default coordinates and status
/// `PROVISIONING`. The password field is not valid ciphertext.
pub fn sample_new_tenant(tenant_slug: &str) -> NewTenant {
    let mut company = tenant_slug.to_string();
    if let Some(first) = company.get_mut(0..1) {
        first.make_ascii_uppercase();
    }

    NewTenant {
        tenant_slug: tenant_slug.to_string(),
        company_name: format!("{} Inc", company),
        database_name: format!("{}_compliance_db", tenant_slug),
        database_user: format!("{}_user", tenant_slug),
        database_password_encrypted: "not-encrypted".to_string(),
        database_host: "localhost".to_string(),
        database_port: 5432,
        subscription_plan: SubscriptionPlan::Basic,
        status: TenantStatus::Provisioning,
    }
}

/// Tenant directory held in memory.
///
/// Slug uniqueness is checked under the same lock as the insert, so
/// concurrent creates have exactly one winner.
#[derive(Default)]
pub struct InMemoryTenantDirectory {
    records: Mutex<Vec<TenantRecord>>,
    unavailable: AtomicBool,
}

impl InMemoryTenantDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with a connection error
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Soft-delete a tenant
    pub async fn deactivate(&self, tenant_slug: &str) {
        let mut records = self.records.lock().await;
        if let Some(record) = records.iter_mut().find(|r| r.tenant_slug == tenant_slug) {
            record.is_active = false;
            record.status = TenantStatus::Inactive;
        }
    }

    pub async fn all(&self) -> Vec<TenantRecord> {
        self.records.lock().await.clone()
    }

    fn check_available(&self) -> Result<(), DirectoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DirectoryError::Connection {
                message: "directory unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl TenantDirectory for InMemoryTenantDirectory {
    async fn create(&self, tenant: NewTenant) -> Result<TenantRecord, DirectoryError> {
        self.check_available()?;
        let mut records = self.records.lock().await;
        if records.iter().any(|r| r.tenant_slug == tenant.tenant_slug) {
            return Err(DirectoryError::DuplicateSlug {
                slug: tenant.tenant_slug,
            });
        }

        let now = Utc::now();
        let record = TenantRecord {
            id: Uuid::new_v4(),
            tenant_slug: tenant.tenant_slug,
            company_name: tenant.company_name,
            database_name: tenant.database_name,
            database_user: tenant.database_user,
            database_password_encrypted: tenant.database_password_encrypted,
            database_host: tenant.database_host,
            database_port: tenant.database_port,
            subscription_plan: tenant.subscription_plan,
            status: tenant.status,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn get_by_slug(&self, tenant_slug: &str, active_only: bool) -> Result<Option<TenantRecord>, DirectoryError> {
        self.check_available()?;
        let records = self.records.lock().await;
        Ok(records
            .iter()
            .find(|r| r.tenant_slug == tenant_slug && (!active_only || r.is_active))
            .cloned())
    }

    async fn update_status(&self, record: &TenantRecord, status: TenantStatus) -> Result<TenantRecord, DirectoryError> {
        self.check_available()?;
        let mut records = self.records.lock().await;
        let stored = records
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or_else(|| DirectoryError::NotFound {
                slug: record.tenant_slug.clone(),
            })?;

        stored.status = status;
        stored.updated_at = Utc::now().max(stored.updated_at + Duration::microseconds(1));
        Ok(stored.clone())
    }

    async fn list_active(&self) -> Result<Vec<TenantRecord>, DirectoryError> {
        self.check_available()?;
        let records = self.records.lock().await;
        Ok(records.iter().filter(|r| r.is_active).cloned().collect())
    }

    async fn count_by_slug(&self, tenant_slug: &str) -> Result<u64, DirectoryError> {
        self.check_available()?;
        let records = self.records.lock().await;
        Ok(records.iter().filter(|r| r.tenant_slug == tenant_slug).count() as u64)
    }

    async fn health_check(&self) -> Result<(), DirectoryError> {
        self.check_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_directory_rejects_duplicates() {
        let directory = InMemoryTenantDirectory::new();
        directory.create(sample_new_tenant("acme")).await.unwrap();

        let err = directory.create(sample_new_tenant("acme")).await.unwrap_err();
        assert_eq!(err, DirectoryError::DuplicateSlug { slug: "acme".to_string() });
    }

    #[tokio::test]
    async fn test_in_memory_directory_bumps_updated_at() {
        let directory = InMemoryTenantDirectory::new();
        let record = directory.create(sample_new_tenant("acme")).await.unwrap();

        let updated = directory.update_status(&record, TenantStatus::Active).await.unwrap();
        assert!(updated.updated_at > record.updated_at);
        assert_eq!(updated.company_name, "Acme Inc");
    }
}
