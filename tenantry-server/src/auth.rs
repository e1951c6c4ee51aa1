//! Shared-token gate for the internal routes

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tenantry_http::INTERNAL_TOKEN_HEADER;
use tracing::warn;

use crate::{context::AppContext, errors::ApiError};

pub async fn require_internal_token(
    State(ctx): State<AppContext>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let presented = request
        .headers()
        .get(INTERNAL_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok());

    match presented {
        Some(token) if !ctx.internal_token.is_empty() && constant_time_eq(token, &ctx.internal_token) => {
            Ok(next.run(request).await)
        }
        _ => {
            warn!(path = %request.uri().path(), "Rejected internal request without a valid token");
            Err(ApiError::Unauthorized)
        }
    }
}

/// Compare without short-circuiting on the first differing byte
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
