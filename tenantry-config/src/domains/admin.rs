//! Administrative data-store configuration
//!
//! Coordinates of the server on which tenant roles and databases are
//! created, plus the host/port recorded on each new tenant.

use crate::error::ConfigResult;
use crate::validation::{
    validate_enum_choice, validate_port_range, validate_positive, validate_required_string, Validatable,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminDatabaseConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default)]
    pub password: String,

    /// Database the provisioner connects to while issuing CREATE DATABASE
    #[serde(default = "default_maintenance_database")]
    pub maintenance_database: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(with = "crate::domains::utils::serde_duration", default = "default_connect_timeout")]
    pub connect_timeout: Duration,

    #[serde(default = "default_ssl_mode")]
    pub ssl_mode: String,

    #[serde(default = "default_application_name")]
    pub application_name: String,

    /// Host stored on new tenant records; falls back to `host`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_host: Option<String>,

    /// Port stored on new tenant records; falls back to `port`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_port: Option<u16>,
}

impl AdminDatabaseConfig {
    pub fn effective_tenant_host(&self) -> &str {
        self.tenant_host.as_deref().unwrap_or(&self.host)
    }

    pub fn effective_tenant_port(&self) -> u16 {
        self.tenant_port.unwrap_or(self.port)
    }
}

impl fmt::Debug for AdminDatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminDatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("maintenance_database", &self.maintenance_database)
            .field("max_connections", &self.max_connections)
            .field("connect_timeout", &self.connect_timeout)
            .field("ssl_mode", &self.ssl_mode)
            .field("application_name", &self.application_name)
            .field("tenant_host", &self.tenant_host)
            .field("tenant_port", &self.tenant_port)
            .finish()
    }
}

impl Default for AdminDatabaseConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            user: default_user(),
            password: String::new(),
            maintenance_database: default_maintenance_database(),
            max_connections: default_max_connections(),
            connect_timeout: default_connect_timeout(),
            ssl_mode: default_ssl_mode(),
            application_name: default_application_name(),
            tenant_host: None,
            tenant_port: None,
        }
    }
}

impl Validatable for AdminDatabaseConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.host, "host", self.domain_name())?;
        validate_port_range(self.port, "port", self.domain_name())?;
        validate_required_string(&self.user, "user", self.domain_name())?;
        validate_required_string(&self.maintenance_database, "maintenance_database", self.domain_name())?;
        validate_positive(self.max_connections, "max_connections", self.domain_name())?;
        validate_positive(self.connect_timeout.as_secs(), "connect_timeout", self.domain_name())?;
        validate_required_string(&self.application_name, "application_name", self.domain_name())?;

        let valid_ssl_modes = ["disable", "allow", "prefer", "require", "verify-ca", "verify-full"];
        validate_enum_choice(&self.ssl_mode, &valid_ssl_modes, "ssl_mode", self.domain_name())?;

        if let Some(host) = &self.tenant_host {
            validate_required_string(host, "tenant_host", self.domain_name())?;
        }
        if let Some(port) = self.tenant_port {
            validate_port_range(port, "tenant_port", self.domain_name())?;
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "admin"
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_user() -> String {
    "postgres".to_string()
}

fn default_maintenance_database() -> String {
    "postgres".to_string()
}

fn default_max_connections() -> u32 {
    2
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_ssl_mode() -> String {
    "prefer".to_string()
}

fn default_application_name() -> String {
    "tenantry".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenant_coordinates_fall_back_to_admin() {
        let mut config = AdminDatabaseConfig::default();
        assert_eq!(config.effective_tenant_host(), "localhost");
        assert_eq!(config.effective_tenant_port(), 5432);

        config.tenant_host = Some("db.internal".to_string());
        config.tenant_port = Some(6432);
        assert_eq!(config.effective_tenant_host(), "db.internal");
        assert_eq!(config.effective_tenant_port(), 6432);
    }

    #[test]
    fn test_ssl_mode_validation() {
        let mut config = AdminDatabaseConfig::default();
        assert!(config.validate().is_ok());

        config.ssl_mode = "sometimes".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = AdminDatabaseConfig {
            password: "pg-admin-secret".to_string(),
            ..Default::default()
        };
        assert!(!format!("{:?}", config).contains("pg-admin-secret"));
    }
}
