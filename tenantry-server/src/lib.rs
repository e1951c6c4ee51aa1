//! # Tenantry Server
//!
//! Axum surface over the provisioning workflow:
//!
//! - `POST /api/v1/tenants/create_tenant/`
//! - `POST /api/v1/distribution/distribute_to_tenant/`
//! - `GET /internal/tenants/{tenant_slug}/credentials/` (internal token)
//! - `POST /internal/tenants/{tenant_slug}/health/` (internal token)
//! - `GET /health`

pub mod app;
pub mod auth;
pub mod context;
pub mod errors;
pub mod handlers;
pub mod services;
pub mod startup;

pub use app::create_app;
pub use context::AppContext;
pub use errors::{ApiError, ApiResult};
pub use services::ServiceContainer;
pub use startup::Server;
