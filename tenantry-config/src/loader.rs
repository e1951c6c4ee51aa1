//! Configuration loading and environment variable handling

use crate::domains::TenantryConfig;
use crate::error::{ConfigError, ConfigResult};
use std::path::Path;
use std::str::FromStr;

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    /// Environment variable prefix
    prefix: String,
}

impl ConfigLoader {
    /// Create a new config loader with the `TENANTRY` prefix
    pub fn new() -> Self {
        Self {
            prefix: "TENANTRY".to_string(),
        }
    }

    /// Create a new config loader with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    /// Load configuration from a YAML file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<TenantryConfig> {
        let content = std::fs::read_to_string(path)?;
        let mut config: TenantryConfig = serde_yaml::from_str(&content)?;

        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env(&self) -> ConfigResult<TenantryConfig> {
        let mut config = TenantryConfig::default();
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load from a file when one is given, otherwise from the environment
    pub fn load(&self, config_path: Option<impl AsRef<Path>>) -> ConfigResult<TenantryConfig> {
        match config_path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    fn apply_env_overrides(&self, config: &mut TenantryConfig) -> ConfigResult<()> {
        self.apply_directory_overrides(&mut config.directory)?;
        self.apply_admin_overrides(&mut config.admin)?;
        self.apply_collaborator_overrides(&mut config.collaborator)?;
        self.apply_security_overrides(&mut config.security)?;
        self.apply_logging_overrides(&mut config.logging)?;
        self.apply_server_overrides(&mut config.server)?;
        Ok(())
    }

    fn apply_directory_overrides(
        &self,
        config: &mut crate::domains::directory::DirectoryConfig,
    ) -> ConfigResult<()> {
        if let Ok(url) = self.get_env_var("DATABASE_URL") {
            config.url = url;
        }

        if let Ok(auto_migrate) = self.get_env_var("DATABASE_AUTO_MIGRATE") {
            config.auto_migrate = auto_migrate
                .parse()
                .map_err(|e| ConfigError::EnvError(format!("Invalid DATABASE_AUTO_MIGRATE: {}", e)))?;
        }

        Ok(())
    }

    fn apply_admin_overrides(
        &self,
        config: &mut crate::domains::admin::AdminDatabaseConfig,
    ) -> ConfigResult<()> {
        if let Ok(host) = self.get_env_var("ADMIN_HOST") {
            config.host = host;
        }

        if let Ok(port) = self.get_env_var("ADMIN_PORT") {
            config.port = port
                .parse()
                .map_err(|e| ConfigError::EnvError(format!("Invalid ADMIN_PORT: {}", e)))?;
        }

        if let Ok(user) = self.get_env_var("ADMIN_USER") {
            config.user = user;
        }

        if let Ok(password) = self.get_env_var("ADMIN_PASSWORD") {
            config.password = password;
        }

        Ok(())
    }

    fn apply_collaborator_overrides(
        &self,
        config: &mut crate::domains::collaborator::CollaboratorConfig,
    ) -> ConfigResult<()> {
        if let Ok(url) = self.get_env_var("COLLABORATOR_URL") {
            config.base_url = url;
        }

        Ok(())
    }

    fn apply_security_overrides(
        &self,
        config: &mut crate::domains::security::SecurityConfig,
    ) -> ConfigResult<()> {
        if let Ok(secret) = self.get_env_var("SECRET_KEY") {
            config.secret_key = secret;
        }

        if let Ok(token) = self.get_env_var("INTERNAL_TOKEN") {
            config.internal_token = token;
        }

        Ok(())
    }

    fn apply_logging_overrides(
        &self,
        config: &mut crate::domains::logging::LoggingConfig,
    ) -> ConfigResult<()> {
        if let Ok(log_level) = self.get_env_var("LOG_LEVEL") {
            config.level = crate::domains::logging::LogLevel::from_str(&log_level)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_LEVEL: {}", log_level)))?;
        }

        if let Ok(format) = self.get_env_var("LOG_FORMAT") {
            config.format = crate::domains::logging::LogFormat::from_str(&format)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_FORMAT: {}", format)))?;
        }

        Ok(())
    }

    fn apply_server_overrides(
        &self,
        config: &mut crate::domains::server::ServerConfig,
    ) -> ConfigResult<()> {
        if let Ok(bind) = self.get_env_var("SERVER_BIND_ADDRESS") {
            config.bind_address = bind;
        }

        if let Ok(port) = self.get_env_var("SERVER_PORT") {
            config.port = port
                .parse()
                .map_err(|e| ConfigError::EnvError(format!("Invalid SERVER_PORT: {}", e)))?;
        }

        Ok(())
    }

    /// Get environment variable with prefix
    fn get_env_var(&self, name: &str) -> Result<String, std::env::VarError> {
        std::env::var(format!("{}_{}", self.prefix, name))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
