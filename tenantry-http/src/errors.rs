//! HTTP error types

/// Errors raised while building the client.
///
/// Failures of individual calls are reported as
/// [`tenantry_core::RemoteCallFailure`] values instead.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}
