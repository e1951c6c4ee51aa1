//! Collaborating service configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, validate_required_string, validate_url, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where and how to reach the service that migrates tenant schemas and
/// seeds framework templates
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollaboratorConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(with = "crate::domains::utils::serde_duration", default = "default_migrate_timeout")]
    pub migrate_timeout: Duration,

    #[serde(with = "crate::domains::utils::serde_duration", default = "default_templates_timeout")]
    pub templates_timeout: Duration,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for CollaboratorConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            migrate_timeout: default_migrate_timeout(),
            templates_timeout: default_templates_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Validatable for CollaboratorConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_url(&self.base_url, "base_url", self.domain_name())?;
        validate_positive(self.migrate_timeout.as_secs(), "migrate_timeout", self.domain_name())?;
        validate_positive(self.templates_timeout.as_secs(), "templates_timeout", self.domain_name())?;
        validate_required_string(&self.user_agent, "user_agent", self.domain_name())?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "collaborator"
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_migrate_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_templates_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_user_agent() -> String {
    format!("tenantry/{}", env!("CARGO_PKG_VERSION"))
}
