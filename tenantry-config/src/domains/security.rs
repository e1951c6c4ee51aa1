//! Service-wide secrets

use crate::error::ConfigResult;
use crate::validation::{validate_required_string, Validatable};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Secrets shared with the rest of the platform.
///
/// Both values are required; there are no usable defaults.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Key material for encrypting stored tenant database passwords
    pub secret_key: String,

    /// Value of the `X-Internal-Token` header, sent to the collaborating
    /// service and required on internal endpoints
    pub internal_token: String,
}

impl fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("secret_key", &"<redacted>")
            .field("internal_token", &"<redacted>")
            .finish()
    }
}

impl Validatable for SecurityConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.secret_key, "secret_key", self.domain_name())?;
        validate_required_string(&self.internal_token, "internal_token", self.domain_name())?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "security"
    }
}
