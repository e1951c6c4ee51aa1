//! # Tenantry Storage
//!
//! Persistence for the provisioning workflow:
//!
//! - [`SeaOrmTenantDirectory`]: tenant records in any SeaORM-supported
//!   database, with the unique slug enforced by the schema
//! - [`PostgresProvisioner`]: idempotent role/database reconciliation on the
//!   administrative PostgreSQL server
//! - [`PostgresProbe`]: `SELECT 1` liveness check against a tenant database

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod pg;
pub mod probe;
pub mod provisioner;
pub mod repositories;

pub use connection::{DirectoryConnection, StorageError};
pub use pg::{base_connection_config, pg_connect_options};
pub use probe::PostgresProbe;
pub use provisioner::{plan_statements, AdminStatement, ObservedState, PostgresProvisioner, QuotedNames};
pub use repositories::tenant_directory::SeaOrmTenantDirectory;
