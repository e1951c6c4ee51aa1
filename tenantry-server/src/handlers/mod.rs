//! Route handlers

pub mod health;
pub mod internal;
pub mod tenants;

pub use health::health_check;
pub use internal::{tenant_credentials, tenant_health};
pub use tenants::{create_tenant, distribute_to_tenant};
