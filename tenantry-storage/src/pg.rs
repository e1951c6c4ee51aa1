//! PostgreSQL connection helpers shared by the provisioner and the probe

use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::str::FromStr;
use tenantry_config::AdminDatabaseConfig;
use tenantry_core::ConnectionConfig;

/// Base connection configuration derived from the administrative settings.
///
/// Tenant connections are built by overriding user, password, database and
/// coordinates on top of this.
pub fn base_connection_config(admin: &AdminDatabaseConfig) -> ConnectionConfig {
    ConnectionConfig {
        host: admin.host.clone(),
        port: admin.port,
        user: admin.user.clone(),
        password: admin.password.clone(),
        database: admin.maintenance_database.clone(),
        ssl_mode: admin.ssl_mode.clone(),
        application_name: admin.application_name.clone(),
        connect_timeout_secs: admin.connect_timeout.as_secs(),
    }
}

/// Translate a [`ConnectionConfig`] into sqlx connect options
pub fn pg_connect_options(config: &ConnectionConfig) -> Result<PgConnectOptions, String> {
    let ssl_mode = PgSslMode::from_str(&config.ssl_mode)
        .map_err(|e| format!("invalid ssl_mode '{}': {}", config.ssl_mode, e))?;

    Ok(PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.database)
        .ssl_mode(ssl_mode)
        .application_name(&config.application_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_config_targets_maintenance_database() {
        let admin = AdminDatabaseConfig {
            host: "pg.internal".to_string(),
            password: "admin-pass".to_string(),
            ..Default::default()
        };
        let base = base_connection_config(&admin);
        assert_eq!(base.host, "pg.internal");
        assert_eq!(base.database, "postgres");
        assert_eq!(base.password, "admin-pass");
        assert_eq!(base.connect_timeout_secs, 10);
    }

    #[test]
    fn test_connect_options() {
        let config = ConnectionConfig {
            host: "db.example.com".to_string(),
            port: 6543,
            database: "acme_compliance_db".to_string(),
            ..Default::default()
        };
        let options = pg_connect_options(&config).unwrap();
        assert_eq!(options.get_host(), "db.example.com");
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_database(), Some("acme_compliance_db"));
    }

    #[test]
    fn test_bad_ssl_mode() {
        let config = ConnectionConfig {
            ssl_mode: "sometimes".to_string(),
            ..Default::default()
        };
        assert!(pg_connect_options(&config).is_err());
    }
}
