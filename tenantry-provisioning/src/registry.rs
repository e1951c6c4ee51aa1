//! Runtime registry of tenant database connections
//!
//! One [`ConnectionRegistry`] is built at startup and shared by `Arc` with
//! everything that needs tenant connections. Entries are keyed by
//! `{slug}_compliance_db`, overwritten on re-registration and only dropped
//! by [`ConnectionRegistry::shutdown`].

use std::collections::HashMap;
use std::sync::Arc;
use tenantry_core::{
    connection_name_for, with_overrides, ConnectionConfig, ConnectionOverrides, CredentialBundle, SecretCodec,
    TenantRecord, TenantryError,
};
use tenantry_interfaces::TenantDirectory;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// Result of a bulk load of active tenants
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Connection names that were registered
    pub registered: Vec<String>,
    /// `(tenant_slug, reason)` for every tenant that was skipped
    pub failed: Vec<(String, String)>,
}

pub struct ConnectionRegistry {
    connections: RwLock<HashMap<String, ConnectionConfig>>,
    base: ConnectionConfig,
    directory: Arc<dyn TenantDirectory>,
    codec: SecretCodec,
}

impl ConnectionRegistry {
    /// `base` supplies ssl mode, application name and timeouts for every
    /// tenant connection
    pub fn new(base: ConnectionConfig, directory: Arc<dyn TenantDirectory>, codec: SecretCodec) -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            base,
            directory,
            codec,
        }
    }

    /// Insert or overwrite a connection
    pub async fn register(&self, connection_name: impl Into<String>, config: ConnectionConfig) {
        let connection_name = connection_name.into();
        let replaced = self
            .connections
            .write()
            .await
            .insert(connection_name.clone(), config)
            .is_some();
        debug!(connection_name = %connection_name, replaced, "Registered tenant connection");
    }

    pub async fn get(&self, connection_name: &str) -> Option<ConnectionConfig> {
        self.connections.read().await.get(connection_name).cloned()
    }

    pub async fn contains(&self, connection_name: &str) -> bool {
        self.connections.read().await.contains_key(connection_name)
    }

    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }

    /// Registered connection names, sorted
    pub async fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.connections.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Connection configuration for a tenant given its plaintext password
    pub fn config_for(&self, record: &TenantRecord, password: &str) -> ConnectionConfig {
        with_overrides(
            &self.base,
            ConnectionOverrides {
                host: Some(record.database_host.clone()),
                port: Some(record.database_port),
                user: Some(record.database_user.clone()),
                password: Some(password.to_string()),
                database: Some(record.database_name.clone()),
            },
        )
    }

    /// Register a tenant whose password is already known
    pub async fn register_tenant(&self, record: &TenantRecord, password: &str) -> String {
        let connection_name = record.connection_name();
        self.register(connection_name.clone(), self.config_for(record, password)).await;
        connection_name
    }

    /// Decrypt the stored password and register the tenant
    pub async fn register_record(&self, record: &TenantRecord) -> Result<String, TenantryError> {
        let password = self.codec.decrypt(&record.database_password_encrypted)?;
        Ok(self.register_tenant(record, &password).await)
    }

    /// Return the tenant's connection name, registering it from the directory
    /// first when it is not known yet
    pub async fn get_or_register_on_demand(&self, tenant_slug: &str) -> Result<String, TenantryError> {
        let connection_name = connection_name_for(tenant_slug);
        if self.contains(&connection_name).await {
            return Ok(connection_name);
        }

        let record = self
            .directory
            .get_by_slug(tenant_slug, true)
            .await?
            .ok_or_else(|| TenantryError::TenantNotFound(tenant_slug.to_string()))?;

        let connection_name = self.register_record(&record).await?;
        info!(tenant_slug, connection_name = %connection_name, "Registered tenant connection on demand");
        Ok(connection_name)
    }

    /// Register every active tenant.
    ///
    /// Best effort: a tenant that cannot be registered is logged and skipped,
    /// and a directory failure yields an empty report.
    pub async fn load_all_active(&self) -> LoadReport {
        let mut report = LoadReport::default();

        let records = match self.directory.list_active().await {
            Ok(records) => records,
            Err(e) => {
                error!("Could not list active tenants: {}", e);
                return report;
            }
        };

        for record in records {
            match self.register_record(&record).await {
                Ok(connection_name) => report.registered.push(connection_name),
                Err(e) => {
                    warn!(tenant_slug = %record.tenant_slug, "Skipping tenant connection: {}", e);
                    report.failed.push((record.tenant_slug.clone(), e.to_string()));
                }
            }
        }

        info!(
            registered = report.registered.len(),
            failed = report.failed.len(),
            "Loaded active tenant connections"
        );
        report
    }

    /// Startup hook: bulk-load active tenants
    pub async fn init(&self) -> LoadReport {
        self.load_all_active().await
    }

    /// Shutdown hook: forget every registered connection
    pub async fn shutdown(&self) {
        let mut connections = self.connections.write().await;
        let count = connections.len();
        connections.clear();
        info!(count, "Connection registry shut down");
    }

    /// Decrypted credentials of an active tenant
    pub async fn credential_bundle(&self, tenant_slug: &str) -> Result<CredentialBundle, TenantryError> {
        let record = self
            .directory
            .get_by_slug(tenant_slug, true)
            .await?
            .ok_or_else(|| TenantryError::TenantNotFound(tenant_slug.to_string()))?;

        let database_password = self.codec.decrypt(&record.database_password_encrypted)?;

        Ok(CredentialBundle {
            connection_name: record.connection_name(),
            database_name: record.database_name,
            database_user: record.database_user,
            database_password,
            database_host: record.database_host,
            database_port: record.database_port,
        })
    }
}
