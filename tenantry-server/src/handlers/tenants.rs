//! Tenant creation and template distribution

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;
use tenantry_provisioning::{CreateTenantRequest, LedgerStep};
use tracing::info;

use crate::{
    context::AppContext,
    errors::{error_body, status_for, ApiResult},
};

/// `POST /api/v1/tenants/create_tenant/`
///
/// 201 with the tenant and ledger when the attempt got past the fatal
/// steps, even if a remote call degraded the final status. Rejections and
/// fatal failures carry the ledger as well.
pub async fn create_tenant(
    State(ctx): State<AppContext>,
    Json(request): Json<CreateTenantRequest>,
) -> impl IntoResponse {
    match ctx.orchestrator.create_tenant(request).await {
        Ok(outcome) => {
            info!(
                tenant_slug = %outcome.tenant.tenant_slug,
                status = %outcome.tenant.status,
                reused = outcome.reused,
                "Tenant create request handled"
            );
            let body = json!({
                "success": true,
                "message": format!("Tenant \"{}\" created successfully", outcome.tenant.company_name),
                "provisioning": {
                    "connection_name": outcome.connection_name,
                    "reused": outcome.reused,
                    "migration_success": outcome.ledger.is_ok(LedgerStep::Migrations),
                    "template_success": outcome.ledger.is_ok(LedgerStep::Templates),
                    "ledger": outcome.ledger,
                },
                "tenant": outcome.tenant,
            });
            (StatusCode::CREATED, Json(body))
        }
        Err(failure) => {
            let body = json!({
                "success": false,
                "error": error_body(&failure.error),
                "tenant": failure.tenant,
                "ledger": failure.ledger,
            });
            (status_for(&failure.error), Json(body))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DistributeRequest {
    pub tenant_slug: Option<String>,
    pub framework_ids: Option<Vec<i64>>,
}

/// `POST /api/v1/distribution/distribute_to_tenant/`
pub async fn distribute_to_tenant(
    State(ctx): State<AppContext>,
    Json(request): Json<DistributeRequest>,
) -> ApiResult<impl IntoResponse> {
    let outcome = ctx
        .orchestrator
        .redistribute_templates(request.tenant_slug.as_deref(), request.framework_ids)
        .await?;

    Ok(Json(json!({
        "success": true,
        "tenant_slug": outcome.tenant_slug,
        "company_name": outcome.company_name,
        "result": outcome.distribution,
    })))
}
