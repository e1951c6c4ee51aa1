//! Core error types for tenantry

use thiserror::Error;

/// Top-level error taxonomy for tenant provisioning
#[derive(Debug, Error)]
pub enum TenantryError {
    /// Bad, reserved or malformed input. Raised before any side effect.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Slug already registered in the directory
    #[error("Tenant with slug '{0}' already exists")]
    DuplicateSlug(String),

    /// No active tenant record for the slug
    #[error("Tenant {0} not found")]
    TenantNotFound(String),

    /// Administrative data-store operation failed
    #[error("Provisioning error: {0}")]
    Provisioning(#[from] ProvisioningError),

    /// Collaborating service call failed
    #[error("Remote call failed: {0}")]
    RemoteCall(#[from] RemoteCallFailure),

    /// Stored credentials could not be decrypted
    #[error("Decryption error: {0}")]
    Decryption(#[from] DecryptionError),

    /// Tenant directory storage failure
    #[error("Directory error: {0}")]
    Directory(String),

    /// Configuration problems
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for tenantry
pub type Result<T> = std::result::Result<T, TenantryError>;

impl TenantryError {
    /// Stable error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            TenantryError::Validation(_) => "VALIDATION_ERROR",
            TenantryError::DuplicateSlug(_) => "DUPLICATE_SLUG",
            TenantryError::TenantNotFound(_) => "TENANT_NOT_FOUND",
            TenantryError::Provisioning(_) => "PROVISIONING_ERROR",
            TenantryError::RemoteCall(_) => "REMOTE_CALL_FAILURE",
            TenantryError::Decryption(_) => "DECRYPTION_ERROR",
            TenantryError::Directory(_) => "DIRECTORY_ERROR",
            TenantryError::Config(_) => "CONFIG_ERROR",
        }
    }
}

/// Input validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("tenant_slug may not contain underscores or spaces (use hyphens)")]
    IllegalCharacters,

    #[error("tenant_slug \"{0}\" is reserved; choose another")]
    Reserved(String),

    #[error("tenant_slug must match ^[a-z0-9-]{{3,50}}$ (lowercase letters, numbers, hyphens)")]
    Malformed,

    #[error("Invalid subscription plan: {0}")]
    UnknownPlan(String),

    #[error("Invalid tenant status: {0}")]
    UnknownStatus(String),
}

/// Administrative data-store errors raised while provisioning a tenant database
#[derive(Debug, Clone, Error)]
pub enum ProvisioningError {
    #[error("Could not connect to administrative database: {0}")]
    Connection(String),

    #[error("Failed to quote identifier '{identifier}': {message}")]
    Quoting { identifier: String, message: String },

    #[error("Statement '{step}' failed: {message}")]
    Statement { step: &'static str, message: String },
}

/// Failure of a call to the collaborating service.
///
/// Returned as a value from the orchestration client so the reason can be
/// kept in the provisioning ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteCallFailure {
    #[error("remote responded with HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("remote call timed out after {0}s")]
    Timeout(u64),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid response body: {0}")]
    InvalidBody(String),
}

/// Secret codec errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecryptionError {
    #[error("ciphertext is not valid base64")]
    Encoding,

    #[error("ciphertext is truncated")]
    Truncated,

    #[error("ciphertext failed authentication (wrong secret or corrupted data)")]
    Authentication,

    #[error("decrypted payload is not valid UTF-8")]
    Utf8,

    #[error("encryption failed")]
    Encryption,
}
