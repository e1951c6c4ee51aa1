use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tenantry_config::DirectoryConfig;
use thiserror::Error;
use tracing::{debug, info};

use crate::migrations::Migrator;

/// Connection to the tenant directory database
#[derive(Clone)]
pub struct DirectoryConnection {
    connection: DatabaseConnection,
    config: DirectoryConfig,
}

/// Storage-level errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    DbError(#[from] DbErr),

    #[error("Migration error: {0}")]
    MigrationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl DirectoryConnection {
    /// Connect using the directory configuration
    pub async fn new(config: DirectoryConfig) -> Result<Self, StorageError> {
        info!("Connecting to tenant directory database");

        let in_memory = config.url.contains(":memory:");

        let mut opts = ConnectOptions::new(&config.url);
        opts.connect_timeout(config.connection_timeout)
            .acquire_timeout(config.connection_timeout)
            .sqlx_logging(true)
            .sqlx_logging_level(log::LevelFilter::Debug);

        if in_memory {
            // every pooled connection would otherwise see its own empty database
            opts.max_connections(1).min_connections(1);
        } else {
            opts.max_connections(config.max_connections)
                .min_connections(config.min_connections)
                .idle_timeout(Duration::from_secs(300))
                .max_lifetime(Duration::from_secs(3600));
        }

        let connection = Database::connect(opts).await?;

        debug!(
            in_memory,
            max_connections = config.max_connections,
            "Tenant directory connection established"
        );

        Ok(Self { connection, config })
    }

    /// Get the underlying SeaORM connection
    pub fn get_connection(&self) -> &DatabaseConnection {
        &self.connection
    }

    pub fn get_config(&self) -> &DirectoryConfig {
        &self.config
    }

    /// Run directory migrations
    pub async fn migrate(&self) -> Result<(), StorageError> {
        info!("Running tenant directory migrations");

        Migrator::up(&self.connection, None)
            .await
            .map_err(|e| StorageError::MigrationError(e.to_string()))?;

        info!("Tenant directory migrations completed");
        Ok(())
    }

    /// Check database connectivity
    pub async fn ping(&self) -> Result<(), StorageError> {
        self.connection.ping().await.map_err(|e| {
            debug!("Directory ping failed: {}", e);
            StorageError::DbError(e)
        })
    }

    /// Close the connection pool
    pub async fn close(self) -> Result<(), StorageError> {
        info!("Closing tenant directory connection");
        self.connection.close().await?;
        Ok(())
    }
}
