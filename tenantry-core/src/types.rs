//! Tenant domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ValidationError;

/// Lifecycle status of a tenant record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TenantStatus {
    Provisioning,
    Active,
    Suspended,
    Inactive,
    ProvisioningFailed,
}

impl TenantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenantStatus::Provisioning => "PROVISIONING",
            TenantStatus::Active => "ACTIVE",
            TenantStatus::Suspended => "SUSPENDED",
            TenantStatus::Inactive => "INACTIVE",
            TenantStatus::ProvisioningFailed => "PROVISIONING_FAILED",
        }
    }
}

impl fmt::Display for TenantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TenantStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PROVISIONING" => Ok(TenantStatus::Provisioning),
            "ACTIVE" => Ok(TenantStatus::Active),
            "SUSPENDED" => Ok(TenantStatus::Suspended),
            "INACTIVE" => Ok(TenantStatus::Inactive),
            "PROVISIONING_FAILED" => Ok(TenantStatus::ProvisioningFailed),
            other => Err(ValidationError::UnknownStatus(other.to_string())),
        }
    }
}

/// Subscription tier of a tenant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionPlan {
    #[default]
    Basic,
    Professional,
    Enterprise,
}

impl SubscriptionPlan {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionPlan::Basic => "BASIC",
            SubscriptionPlan::Professional => "PROFESSIONAL",
            SubscriptionPlan::Enterprise => "ENTERPRISE",
        }
    }
}

impl fmt::Display for SubscriptionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionPlan {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BASIC" => Ok(SubscriptionPlan::Basic),
            "PROFESSIONAL" => Ok(SubscriptionPlan::Professional),
            "ENTERPRISE" => Ok(SubscriptionPlan::Enterprise),
            other => Err(ValidationError::UnknownPlan(other.to_string())),
        }
    }
}

/// Persisted tenant record, the single source of truth for a tenant's
/// provisioning state and database coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantRecord {
    pub id: Uuid,
    pub tenant_slug: String,
    pub company_name: String,
    pub database_name: String,
    pub database_user: String,
    /// Ciphertext produced by [`crate::SecretCodec`]; never the plaintext
    #[serde(skip_serializing)]
    pub database_password_encrypted: String,
    pub database_host: String,
    pub database_port: u16,
    pub subscription_plan: SubscriptionPlan,
    pub status: TenantStatus,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TenantRecord {
    /// Registry key under which this tenant's connection is published
    pub fn connection_name(&self) -> String {
        crate::connection::connection_name_for(&self.tenant_slug)
    }
}

/// Values needed to insert a new tenant record
#[derive(Debug, Clone)]
pub struct NewTenant {
    pub tenant_slug: String,
    pub company_name: String,
    pub database_name: String,
    pub database_user: String,
    pub database_password_encrypted: String,
    pub database_host: String,
    pub database_port: u16,
    pub subscription_plan: SubscriptionPlan,
    pub status: TenantStatus,
}

/// Freshly generated (or decrypted) database credentials for one tenant
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseCredentials {
    pub database_name: String,
    pub database_user: String,
    pub password: String,
}

impl fmt::Debug for DatabaseCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseCredentials")
            .field("database_name", &self.database_name)
            .field("database_user", &self.database_user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Decrypted credential bundle handed to sibling services
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialBundle {
    pub database_name: String,
    pub database_user: String,
    pub database_password: String,
    pub database_host: String,
    pub database_port: u16,
    pub connection_name: String,
}

impl fmt::Debug for CredentialBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialBundle")
            .field("database_name", &self.database_name)
            .field("database_user", &self.database_user)
            .field("database_password", &"<redacted>")
            .field("database_host", &self.database_host)
            .field("database_port", &self.database_port)
            .field("connection_name", &self.connection_name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [
            TenantStatus::Provisioning,
            TenantStatus::Active,
            TenantStatus::Suspended,
            TenantStatus::Inactive,
            TenantStatus::ProvisioningFailed,
        ] {
            assert_eq!(status.as_str().parse::<TenantStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_plan_parsing_is_case_insensitive() {
        assert_eq!("professional".parse::<SubscriptionPlan>().unwrap(), SubscriptionPlan::Professional);
        assert_eq!(SubscriptionPlan::default(), SubscriptionPlan::Basic);
        assert!(matches!(
            "gold".parse::<SubscriptionPlan>(),
            Err(ValidationError::UnknownPlan(_))
        ));
    }

    #[test]
    fn test_status_serializes_screaming_snake() {
        let json = serde_json::to_string(&TenantStatus::ProvisioningFailed).unwrap();
        assert_eq!(json, "\"PROVISIONING_FAILED\"");
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = DatabaseCredentials {
            database_name: "acme_compliance_db".to_string(),
            database_user: "acme_user".to_string(),
            password: "s3cret!".to_string(),
        };
        let rendered = format!("{:?}", creds);
        assert!(!rendered.contains("s3cret!"));
        assert!(rendered.contains("acme_user"));
    }
}
