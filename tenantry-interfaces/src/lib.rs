//! # Tenantry Interfaces
//!
//! Async traits at the boundaries of the provisioning workflow. The
//! orchestrator only talks to these traits; concrete implementations live in
//! `tenantry-storage` (directory, provisioner, probe) and `tenantry-http`
//! (collaborating service client).
//!
//! ## Main Interfaces
//!
//! - [`TenantDirectory`] - persisted tenant records with a unique slug
//! - [`DatabaseProvisioner`] - idempotent database/role reconciliation
//! - [`RemoteOrchestrator`] - schema migration and template seeding calls
//! - [`ConnectionProbe`] - liveness query against a tenant database

pub mod directory;
pub mod probe;
pub mod provisioner;
pub mod remote;

pub use directory::{DirectoryError, TenantDirectory};
pub use probe::{ConnectionProbe, ProbeError};
pub use provisioner::DatabaseProvisioner;
pub use remote::{RemoteOrchestrator, TemplateDistribution};
