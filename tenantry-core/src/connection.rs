//! Tenant connection configuration

use serde::{Deserialize, Serialize};
use std::fmt;

/// Registry key for a tenant's connection
pub fn connection_name_for(tenant_slug: &str) -> String {
    format!("{}_compliance_db", tenant_slug)
}

/// Full configuration needed to open a connection to one tenant database
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    /// libpq-style SSL mode (`disable`, `prefer`, `require`, ...)
    pub ssl_mode: String,
    pub application_name: String,
    pub connect_timeout_secs: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: String::new(),
            database: "postgres".to_string(),
            ssl_mode: "prefer".to_string(),
            application_name: "tenantry".to_string(),
            connect_timeout_secs: 10,
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("ssl_mode", &self.ssl_mode)
            .field("application_name", &self.application_name)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

/// Per-tenant values layered over a base [`ConnectionConfig`]
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ConnectionOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
}

impl fmt::Debug for ConnectionOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionOverrides")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("database", &self.database)
            .finish()
    }
}

/// Merge overrides onto a base configuration without mutating either input
pub fn with_overrides(base: &ConnectionConfig, overrides: ConnectionOverrides) -> ConnectionConfig {
    ConnectionConfig {
        host: overrides.host.unwrap_or_else(|| base.host.clone()),
        port: overrides.port.unwrap_or(base.port),
        user: overrides.user.unwrap_or_else(|| base.user.clone()),
        password: overrides.password.unwrap_or_else(|| base.password.clone()),
        database: overrides.database.unwrap_or_else(|| base.database.clone()),
        ssl_mode: base.ssl_mode.clone(),
        application_name: base.application_name.clone(),
        connect_timeout_secs: base.connect_timeout_secs,
    }
}
