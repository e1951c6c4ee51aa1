//! Tenant directory implementation using SeaORM

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, SqlErr,
    Unchanged,
};
use tenantry_core::{NewTenant, TenantRecord, TenantStatus};
use tenantry_interfaces::{DirectoryError, TenantDirectory};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::connection::DirectoryConnection;
use crate::entities::{tenant_database_info, TenantDatabaseInfo};

/// SeaORM implementation of [`TenantDirectory`]
#[derive(Clone)]
pub struct SeaOrmTenantDirectory {
    db: DirectoryConnection,
}

impl SeaOrmTenantDirectory {
    pub fn new(db: DirectoryConnection) -> Self {
        Self { db }
    }

    fn to_record(model: tenant_database_info::Model) -> Result<TenantRecord, DirectoryError> {
        let database_port = u16::try_from(model.database_port).map_err(|_| DirectoryError::Internal {
            message: format!(
                "Stored port {} for tenant {} is out of range",
                model.database_port, model.tenant_slug
            ),
        })?;

        Ok(TenantRecord {
            id: model.id,
            tenant_slug: model.tenant_slug,
            company_name: model.company_name,
            database_name: model.database_name,
            database_user: model.database_user,
            database_password_encrypted: model.database_password_encrypted,
            database_host: model.database_host,
            database_port,
            subscription_plan: model.subscription_plan.into(),
            status: model.status.into(),
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }

    fn map_err(context: &str, err: DbErr) -> DirectoryError {
        match err {
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => DirectoryError::Connection {
                message: format!("{}: {}", context, err),
            },
            other => DirectoryError::Internal {
                message: format!("{}: {}", context, other),
            },
        }
    }
}

#[async_trait]
impl TenantDirectory for SeaOrmTenantDirectory {
    async fn create(&self, tenant: NewTenant) -> Result<TenantRecord, DirectoryError> {
        let now = Utc::now();
        let slug = tenant.tenant_slug.clone();

        let active_model = tenant_database_info::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_slug: Set(tenant.tenant_slug),
            company_name: Set(tenant.company_name),
            database_name: Set(tenant.database_name),
            database_user: Set(tenant.database_user),
            database_password_encrypted: Set(tenant.database_password_encrypted),
            database_host: Set(tenant.database_host),
            database_port: Set(i32::from(tenant.database_port)),
            subscription_plan: Set(tenant.subscription_plan.into()),
            status: Set(tenant.status.into()),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model
            .insert(self.db.get_connection())
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    debug!(tenant_slug = %slug, "Unique constraint rejected duplicate tenant slug");
                    DirectoryError::DuplicateSlug { slug: slug.clone() }
                }
                _ => Self::map_err("Failed to create tenant", e),
            })?;

        Self::to_record(model)
    }

    async fn get_by_slug(
        &self,
        tenant_slug: &str,
        active_only: bool,
    ) -> Result<Option<TenantRecord>, DirectoryError> {
        let mut query = TenantDatabaseInfo::find().filter(tenant_database_info::Column::TenantSlug.eq(tenant_slug));
        if active_only {
            query = query.filter(tenant_database_info::Column::IsActive.eq(true));
        }

        let model = query
            .one(self.db.get_connection())
            .await
            .map_err(|e| Self::map_err("Failed to find tenant by slug", e))?;

        model.map(Self::to_record).transpose()
    }

    async fn update_status(
        &self,
        record: &TenantRecord,
        status: TenantStatus,
    ) -> Result<TenantRecord, DirectoryError> {
        let active_model = tenant_database_info::ActiveModel {
            id: Unchanged(record.id),
            status: Set(status.into()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };

        let model = active_model
            .update(self.db.get_connection())
            .await
            .map_err(|e| match e {
                DbErr::RecordNotUpdated | DbErr::RecordNotFound(_) => DirectoryError::NotFound {
                    slug: record.tenant_slug.clone(),
                },
                other => Self::map_err("Failed to update tenant status", other),
            })?;

        Self::to_record(model)
    }

    async fn list_active(&self) -> Result<Vec<TenantRecord>, DirectoryError> {
        let models = TenantDatabaseInfo::find()
            .filter(tenant_database_info::Column::IsActive.eq(true))
            .order_by_asc(tenant_database_info::Column::CreatedAt)
            .all(self.db.get_connection())
            .await
            .map_err(|e| Self::map_err("Failed to list active tenants", e))?;

        let mut records = Vec::with_capacity(models.len());
        for model in models {
            match Self::to_record(model) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping unreadable tenant row: {}", e),
            }
        }
        Ok(records)
    }

    async fn count_by_slug(&self, tenant_slug: &str) -> Result<u64, DirectoryError> {
        TenantDatabaseInfo::find()
            .filter(tenant_database_info::Column::TenantSlug.eq(tenant_slug))
            .count(self.db.get_connection())
            .await
            .map_err(|e| Self::map_err("Failed to count tenants", e))
    }

    async fn health_check(&self) -> Result<(), DirectoryError> {
        self.db.ping().await.map_err(|e| DirectoryError::Connection {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tenantry_config::DirectoryConfig;
    use tenantry_core::SubscriptionPlan;

    async fn directory() -> SeaOrmTenantDirectory {
        let db = DirectoryConnection::new(DirectoryConfig {
            url: "sqlite::memory:".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
        db.migrate().await.unwrap();
        SeaOrmTenantDirectory::new(db)
    }

    fn new_tenant(slug: &str) -> NewTenant {
        NewTenant {
            tenant_slug: slug.to_string(),
            company_name: format!("{} Inc", slug),
            database_name: format!("{}_compliance_db", slug),
            database_user: format!("{}_user", slug),
            database_password_encrypted: "ciphertext".to_string(),
            database_host: "localhost".to_string(),
            database_port: 5432,
            subscription_plan: SubscriptionPlan::Professional,
            status: TenantStatus::Provisioning,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let directory = directory().await;
        let created = directory.create(new_tenant("acme")).await.unwrap();

        assert_eq!(created.status, TenantStatus::Provisioning);
        assert!(created.is_active);
        assert_eq!(created.created_at, created.updated_at);

        let fetched = directory.get_by_slug("acme", true).await.unwrap().unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.subscription_plan, SubscriptionPlan::Professional);
        assert_eq!(fetched.database_port, 5432);

        assert!(directory.get_by_slug("globex", false).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_slug_rejected() {
        let directory = directory().await;
        directory.create(new_tenant("acme")).await.unwrap();

        let err = directory.create(new_tenant("acme")).await.unwrap_err();
        assert_eq!(
            err,
            DirectoryError::DuplicateSlug {
                slug: "acme".to_string()
            }
        );
        assert_eq!(directory.count_by_slug("acme").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_creates_have_one_winner() {
        let directory = Arc::new(directory().await);

        let attempts = (0..5).map(|_| {
            let directory = directory.clone();
            tokio::spawn(async move { directory.create(new_tenant("race")).await })
        });
        let results = futures::future::join_all(attempts).await;

        let winners = results.iter().filter(|r| matches!(r, Ok(Ok(_)))).count();
        let duplicates = results
            .iter()
            .filter(|r| matches!(r, Ok(Err(DirectoryError::DuplicateSlug { .. }))))
            .count();
        assert_eq!(winners, 1);
        assert_eq!(duplicates, 4);
        assert_eq!(directory.count_by_slug("race").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_status_bumps_updated_at() {
        let directory = directory().await;
        let created = directory.create(new_tenant("acme")).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let updated = directory.update_status(&created, TenantStatus::Active).await.unwrap();

        assert_eq!(updated.status, TenantStatus::Active);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn test_update_status_unknown_record() {
        let directory = directory().await;
        let mut ghost = directory.create(new_tenant("acme")).await.unwrap();
        ghost.id = Uuid::new_v4();
        ghost.tenant_slug = "ghost".to_string();

        let err = directory.update_status(&ghost, TenantStatus::Active).await.unwrap_err();
        assert!(matches!(err, DirectoryError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_active_in_creation_order() {
        let directory = directory().await;
        for slug in ["alpha", "bravo", "charlie"] {
            directory.create(new_tenant(slug)).await.unwrap();
        }

        let slugs: Vec<String> = directory
            .list_active()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.tenant_slug)
            .collect();
        assert_eq!(slugs, vec!["alpha", "bravo", "charlie"]);
        assert!(directory.health_check().await.is_ok());
    }
}
