//! Tenant directory entity

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use tenantry_core::{SubscriptionPlan, TenantStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tenant_database_info")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub tenant_slug: String,
    pub company_name: String,
    pub database_name: String,
    pub database_user: String,
    #[sea_orm(column_type = "Text")]
    pub database_password_encrypted: String,
    pub database_host: String,
    pub database_port: i32,
    pub subscription_plan: PlanColumn,
    pub status: StatusColumn,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Stored form of [`TenantStatus`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum StatusColumn {
    #[sea_orm(string_value = "PROVISIONING")]
    Provisioning,
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    #[sea_orm(string_value = "SUSPENDED")]
    Suspended,
    #[sea_orm(string_value = "INACTIVE")]
    Inactive,
    #[sea_orm(string_value = "PROVISIONING_FAILED")]
    ProvisioningFailed,
}

/// Stored form of [`SubscriptionPlan`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum PlanColumn {
    #[sea_orm(string_value = "BASIC")]
    Basic,
    #[sea_orm(string_value = "PROFESSIONAL")]
    Professional,
    #[sea_orm(string_value = "ENTERPRISE")]
    Enterprise,
}

impl From<TenantStatus> for StatusColumn {
    fn from(status: TenantStatus) -> Self {
        match status {
            TenantStatus::Provisioning => StatusColumn::Provisioning,
            TenantStatus::Active => StatusColumn::Active,
            TenantStatus::Suspended => StatusColumn::Suspended,
            TenantStatus::Inactive => StatusColumn::Inactive,
            TenantStatus::ProvisioningFailed => StatusColumn::ProvisioningFailed,
        }
    }
}

impl From<StatusColumn> for TenantStatus {
    fn from(status: StatusColumn) -> Self {
        match status {
            StatusColumn::Provisioning => TenantStatus::Provisioning,
            StatusColumn::Active => TenantStatus::Active,
            StatusColumn::Suspended => TenantStatus::Suspended,
            StatusColumn::Inactive => TenantStatus::Inactive,
            StatusColumn::ProvisioningFailed => TenantStatus::ProvisioningFailed,
        }
    }
}

impl From<SubscriptionPlan> for PlanColumn {
    fn from(plan: SubscriptionPlan) -> Self {
        match plan {
            SubscriptionPlan::Basic => PlanColumn::Basic,
            SubscriptionPlan::Professional => PlanColumn::Professional,
            SubscriptionPlan::Enterprise => PlanColumn::Enterprise,
        }
    }
}

impl From<PlanColumn> for SubscriptionPlan {
    fn from(plan: PlanColumn) -> Self {
        match plan {
            PlanColumn::Basic => SubscriptionPlan::Basic,
            PlanColumn::Professional => SubscriptionPlan::Professional,
            PlanColumn::Enterprise => SubscriptionPlan::Enterprise,
        }
    }
}
