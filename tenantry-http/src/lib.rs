//! HTTP client for the collaborating service
//!
//! [`CollaboratorClient`] implements [`tenantry_interfaces::RemoteOrchestrator`]
//! against the internal migrate/distribute endpoints, authenticating with the
//! shared `X-Internal-Token` header.

pub mod client;
pub mod errors;

pub use client::{CollaboratorClient, DISTRIBUTE_TEMPLATES_PATH, INTERNAL_TOKEN_HEADER, MIGRATE_TENANT_PATH};
pub use errors::HttpError;
