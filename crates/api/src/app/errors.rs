use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stockroom_core::DomainError;
use stockroom_infra::StoreError;

use crate::app::services::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Domain(e) => domain_error_to_response(e),
        ServiceError::Store(e) => store_error_to_response(e),
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "product not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::DuplicateSku(sku) => json_error(
            StatusCode::CONFLICT,
            "duplicate_sku",
            format!("a product with sku {sku} already exists"),
        ),
        StoreError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "product not found"),
        StoreError::InsufficientStock => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "insufficient_stock",
            "stock cannot go negative",
        ),
        StoreError::QuantityTooLarge => json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "quantity too large",
        ),
        StoreError::Database(msg) => {
            tracing::error!(error = %msg, "store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", msg)
        }
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
