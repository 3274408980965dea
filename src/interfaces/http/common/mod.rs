//! Shared HTTP building blocks

mod validated_json;

pub use validated_json::{ValidatedJson, ValidatedJsonRejection};

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::DomainError;

/// Standard API response wrapper
///
/// Errors are reported as `{"success": false, "data": null, "error": "..."}`.
/// Successful OCPI tariff responses carry the Tariff object directly.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// `true` when the request succeeded
    pub success: bool,
    /// Payload. `null` on error
    pub data: Option<T>,
    /// Error description. Absent on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Rejection shape shared by handlers and middleware
pub type ErrorResponse = (StatusCode, Json<ApiResponse<()>>);

/// Status and body for a domain error. Storage details stay in the log.
pub fn error_response(error: DomainError) -> ErrorResponse {
    let status = match &error {
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Validation(_) | DomainError::IdentityMismatch { .. } => {
            StatusCode::BAD_REQUEST
        }
        DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        DomainError::Storage(detail) => {
            tracing::error!("Tariff storage failure: {}", detail);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Tariff storage is unavailable")),
            );
        }
    };
    (status, Json(ApiResponse::error(error.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(error: DomainError) -> StatusCode {
        error_response(error).0
    }

    #[test]
    fn domain_errors_map_to_statuses() {
        let not_found = DomainError::NotFound {
            entity: "Tariff",
            field: "key",
            value: "NL/ABC/T1".into(),
        };
        let mismatch = DomainError::IdentityMismatch {
            field: "id",
            expected: "T1".into(),
            actual: "T2".into(),
        };

        assert_eq!(status_of(not_found), StatusCode::NOT_FOUND);
        assert_eq!(status_of(mismatch), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(DomainError::Validation("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(DomainError::Unauthorized("no token".into())),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn storage_error_body_hides_detail() {
        let (status, Json(body)) = error_response(DomainError::Storage("disk I/O error".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.success);
        assert!(body.data.is_none());
        assert_eq!(body.error.as_deref(), Some("Tariff storage is unavailable"));
    }
}
