//! Router assembly

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{auth::require_internal_token, context::AppContext, handlers};

pub const API_PREFIX: &str = "/api/v1";

/// Build the full application: public provisioning API, token-gated
/// internal routes and `/health`
pub fn create_app(ctx: AppContext) -> Router {
    let api = Router::new()
        .route("/tenants/create_tenant/", post(handlers::create_tenant))
        .route("/distribution/distribute_to_tenant/", post(handlers::distribute_to_tenant));

    let internal = Router::new()
        .route(
            "/internal/tenants/{tenant_slug}/credentials/",
            get(handlers::tenant_credentials),
        )
        .route("/internal/tenants/{tenant_slug}/health/", post(handlers::tenant_health))
        .route_layer(middleware::from_fn_with_state(ctx.clone(), require_internal_token));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest(API_PREFIX, api)
        .merge(internal)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
