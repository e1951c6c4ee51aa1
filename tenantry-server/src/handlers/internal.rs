//! Service-to-service routes, gated by the internal token

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use tenantry_provisioning::HealthReport;

use crate::{context::AppContext, errors::ApiResult};

/// `GET /internal/tenants/{tenant_slug}/credentials/`
pub async fn tenant_credentials(
    State(ctx): State<AppContext>,
    Path(tenant_slug): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let credentials = ctx.health.credentials(&tenant_slug).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "tenant_slug": tenant_slug,
        "credentials": credentials,
    })))
}

#[derive(Serialize)]
struct TenantHealthResponse {
    success: bool,
    #[serde(flatten)]
    report: HealthReport,
}

/// `POST /internal/tenants/{tenant_slug}/health/`
///
/// 200 when the liveness query succeeded, 500 otherwise.
pub async fn tenant_health(State(ctx): State<AppContext>, Path(tenant_slug): Path<String>) -> impl IntoResponse {
    let report = ctx.health.check(&tenant_slug).await;
    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (
        status,
        Json(TenantHealthResponse {
            success: report.is_healthy(),
            report,
        }),
    )
}
