//! Logging setup for tenantry
//!
//! Everything logs through `tracing`; this crate only installs the global
//! subscriber according to [`tenantry_config::LoggingConfig`].

pub mod init;

pub use init::{build_env_filter, init_logging_from_config, init_simple_tracing};
