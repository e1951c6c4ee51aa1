//! # Tenantry Provisioning
//!
//! The tenant provisioning workflow and the runtime state it maintains.
//!
//! - [`ConnectionRegistry`]: injected, process-wide map from connection name
//!   to tenant connection configuration
//! - [`ProvisioningOrchestrator`]: sequences credential generation, the
//!   directory row, database provisioning, registry wiring and the two
//!   remote calls, recording every step in a [`ProvisioningLedger`]
//! - [`TenantHealthService`]: credential bundle lookup and liveness checks
//!
//! Enable the `testing` feature for mockall mocks of the collaborator seams
//! and an in-memory [`tenantry_interfaces::TenantDirectory`].

pub mod health;
mod lease;
pub mod ledger;
pub mod orchestrator;
pub mod registry;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use health::{HealthReport, HealthState, TenantHealthService};
pub use ledger::{LedgerStep, ProvisioningLedger, StepOutcome};
pub use orchestrator::{
    CreateTenantRequest, ProvisioningFailure, ProvisioningOrchestrator, ProvisioningOutcome, ProvisioningSettings,
    RedistributionOutcome,
};
pub use registry::{ConnectionRegistry, LoadReport};
