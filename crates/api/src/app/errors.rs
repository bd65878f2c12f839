use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use storefront_core::{DomainError, FieldError};

use crate::app::services::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Unauthenticated => {
            json_error(StatusCode::UNAUTHORIZED, "unauthenticated", "authentication required")
        }
        ServiceError::Domain(e) => domain_error_to_response(e),
        ServiceError::Backend(msg) => {
            tracing::error!(error = %msg, "storage backend failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", msg)
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::PermissionDenied => json_error(StatusCode::FORBIDDEN, "forbidden", "permission denied"),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Validation(fields) => json_field_errors("validation failed", fields),
        e @ DomainError::MultipleActiveVersions => {
            json_field_errors("validation failed", vec![FieldError::non_field(e.to_string())])
        }
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
        DomainError::ConstraintViolation(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// 400 with a per-field error list; `"field": null` marks a form-level error.
pub fn json_field_errors(message: impl Into<String>, fields: Vec<FieldError>) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        axum::Json(json!({
            "error": "validation_error",
            "message": message.into(),
            "fields": fields,
        })),
    )
        .into_response()
}

pub fn parse_id<T>(raw: &str, what: &str) -> Result<T, axum::response::Response>
where
    T: std::str::FromStr,
{
    raw.parse()
        .map_err(|_| json_error(StatusCode::BAD_REQUEST, "invalid_id", format!("invalid {what} id")))
}
