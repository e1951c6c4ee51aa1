//! API error type and its JSON rendering

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tenantry_core::TenantryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized - internal API only")]
    Unauthorized,

    #[error(transparent)]
    Tenantry(#[from] TenantryError),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// HTTP status for a domain error
pub fn status_for(error: &TenantryError) -> StatusCode {
    match error {
        TenantryError::Validation(_)
        | TenantryError::DuplicateSlug(_)
        | TenantryError::Provisioning(_)
        | TenantryError::RemoteCall(_) => StatusCode::BAD_REQUEST,
        TenantryError::TenantNotFound(_) => StatusCode::NOT_FOUND,
        TenantryError::Decryption(_) | TenantryError::Directory(_) | TenantryError::Config(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// `{"code", "message", "status"}` object for a domain error.
///
/// Server-side failures get a generic message; the detail is only logged.
pub fn error_body(error: &TenantryError) -> Value {
    let status = status_for(error);
    let message = if status.is_server_error() {
        tracing::error!(code = error.error_code(), "Request failed: {}", error);
        "Internal server error".to_string()
    } else {
        error.to_string()
    };

    json!({
        "code": error.error_code(),
        "message": message,
        "status": status.as_u16(),
    })
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({
                    "code": "UNAUTHORIZED",
                    "message": self.to_string(),
                    "status": StatusCode::UNAUTHORIZED.as_u16(),
                }),
            ),
            ApiError::Tenantry(e) => (status_for(e), error_body(e)),
        };

        (status, Json(json!({ "success": false, "error": error }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tenantry_core::{DecryptionError, ValidationError};

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&TenantryError::Validation(ValidationError::Malformed)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&TenantryError::TenantNotFound("acme".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&TenantryError::Decryption(DecryptionError::Authentication)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_server_errors_are_sanitized() {
        let body = error_body(&TenantryError::Directory("password=hunter2 host=db".to_string()));
        assert_eq!(body["message"], "Internal server error");
        assert_eq!(body["code"], "DIRECTORY_ERROR");
        assert_eq!(body["status"], 500);
    }
}
