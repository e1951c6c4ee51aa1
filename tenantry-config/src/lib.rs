//! Domain-driven configuration for tenantry
//!
//! Configuration is split by functional domain (directory, admin data store,
//! collaborating service, security, logging, server). Each domain carries
//! its own defaults and validation; [`ConfigLoader`] reads YAML, applies
//! `TENANTRY_*` environment overrides and validates the result.

pub mod error;
pub mod loader;
pub mod validation;

pub mod domains;

pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

pub use domains::{
    admin::AdminDatabaseConfig, collaborator::CollaboratorConfig, directory::DirectoryConfig,
    logging::LoggingConfig, security::SecurityConfig, server::ServerConfig, TenantryConfig,
};

pub use domains::utils::serde_duration;
