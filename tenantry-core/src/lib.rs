//! Core domain types and primitives for tenantry
//!
//! Holds the pieces every other crate agrees on: tenant records and their
//! status machine, the error taxonomy, slug normalization, credential
//! generation and the secret codec used to store database passwords.

pub mod connection;
pub mod credentials;
pub mod error;
pub mod secret;
pub mod types;
pub mod validation;

pub use connection::{connection_name_for, with_overrides, ConnectionConfig, ConnectionOverrides};
pub use credentials::{derive_names, generate_database_credentials, generate_password};
pub use error::{
    DecryptionError, ProvisioningError, RemoteCallFailure, Result, TenantryError, ValidationError,
};
pub use secret::SecretCodec;
pub use types::{
    CredentialBundle, DatabaseCredentials, NewTenant, SubscriptionPlan, TenantRecord, TenantStatus,
};
pub use validation::{validate_and_normalize_slug, validate_company_name, RESERVED_TENANT_SLUGS};
