//! Domain-specific configuration modules

pub mod admin;
pub mod collaborator;
pub mod directory;
pub mod logging;
pub mod security;
pub mod server;
pub mod utils;

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Main tenantry configuration combining all domains
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TenantryConfig {
    /// Database holding the tenant directory
    #[serde(default)]
    pub directory: directory::DirectoryConfig,

    /// Administrative data store where tenant databases are created
    #[serde(default)]
    pub admin: admin::AdminDatabaseConfig,

    /// Collaborating service running migrations and template seeding
    #[serde(default)]
    pub collaborator: collaborator::CollaboratorConfig,

    /// Service-wide secrets
    #[serde(default)]
    pub security: security::SecurityConfig,

    #[serde(default)]
    pub logging: logging::LoggingConfig,

    #[serde(default)]
    pub server: server::ServerConfig,
}

impl TenantryConfig {
    /// Validate all domain configurations
    pub fn validate_all(&self) -> ConfigResult<()> {
        self.directory.validate()?;
        self.admin.validate()?;
        self.collaborator.validate()?;
        self.security.validate()?;
        self.logging.validate()?;
        self.server.validate()?;
        Ok(())
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        let config = TenantryConfig::default();
        serde_yaml::to_string(&config).unwrap_or_else(|_| "# Failed to generate sample config".to_string())
    }
}
