//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::DomainError;
use ledger::LedgerError;
use preparation::PrepareError;
use serde_json::{Value, json};

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Preparation pipeline error.
    Prepare(PrepareError),
    /// Catalog query error.
    Domain(DomainError),
    /// Ledger error outside the preparation pipeline.
    Ledger(LedgerError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, error_body(msg)),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, error_body(msg)),
            ApiError::Prepare(err) => prepare_error_to_response(err),
            ApiError::Domain(DomainError::Ledger(err)) | ApiError::Ledger(err) => {
                ledger_error_to_response(err)
            }
            ApiError::Domain(err) => internal(err.to_string()),
            ApiError::Internal(msg) => internal(msg),
        };

        (status, axum::Json(body)).into_response()
    }
}

fn error_body(message: impl Into<String>) -> Value {
    json!({ "error": message.into() })
}

fn internal(message: String) -> (StatusCode, Value) {
    tracing::error!(error = %message, "internal server error");
    (StatusCode::INTERNAL_SERVER_ERROR, error_body(message))
}

fn prepare_error_to_response(err: PrepareError) -> (StatusCode, Value) {
    let message = err.to_string();
    match err {
        PrepareError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, error_body(message)),
        PrepareError::BeverageNotFound { beverage_id } => (
            StatusCode::NOT_FOUND,
            json!({ "error": message, "beverage_id": beverage_id }),
        ),
        PrepareError::InsufficientStock {
            beverage_id,
            shortages,
        } => (
            StatusCode::CONFLICT,
            json!({ "error": message, "beverage_id": beverage_id, "shortages": shortages }),
        ),
        PrepareError::PaymentFailed { beverage_id } => (
            StatusCode::PAYMENT_REQUIRED,
            json!({ "error": message, "beverage_id": beverage_id }),
        ),
        PrepareError::Ledger(err) => ledger_error_to_response(err),
        PrepareError::Configuration(_) | PrepareError::PaymentGate(_) | PrepareError::Aborted(_) => {
            internal(message)
        }
    }
}

fn ledger_error_to_response(err: LedgerError) -> (StatusCode, Value) {
    let message = err.to_string();
    match err {
        LedgerError::IngredientNotFound(ingredient_id) => (
            StatusCode::NOT_FOUND,
            json!({ "error": message, "ingredient_id": ingredient_id }),
        ),
        LedgerError::WouldGoNegative {
            ingredient_id,
            available,
            requested,
        } => (
            StatusCode::CONFLICT,
            json!({
                "error": message,
                "ingredient_id": ingredient_id,
                "available": available,
                "requested": requested,
            }),
        ),
        LedgerError::StockOverflow(_) | LedgerError::DuplicateName(_) => {
            (StatusCode::CONFLICT, error_body(message))
        }
        LedgerError::InvalidRecipe(_) => (StatusCode::BAD_REQUEST, error_body(message)),
        _ => internal(message),
    }
}

impl From<PrepareError> for ApiError {
    fn from(err: PrepareError) -> Self {
        ApiError::Prepare(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError::Ledger(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{BeverageId, IngredientId};

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_prepare_error_statuses() {
        let id = BeverageId::new(1);
        assert_eq!(
            status_of(PrepareError::BeverageNotFound { beverage_id: id }.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(
                PrepareError::InsufficientStock {
                    beverage_id: id,
                    shortages: Vec::new()
                }
                .into()
            ),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(PrepareError::PaymentFailed { beverage_id: id }.into()),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(
            status_of(PrepareError::InvalidRequest("bad".to_string()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(PrepareError::Configuration("no sugar".to_string()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_ledger_error_statuses() {
        let id = IngredientId::new(3);
        assert_eq!(
            status_of(LedgerError::IngredientNotFound(id).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(
                LedgerError::WouldGoNegative {
                    ingredient_id: id,
                    available: 1,
                    requested: 5
                }
                .into()
            ),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(LedgerError::Unavailable("down".to_string()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(PrepareError::Ledger(LedgerError::IngredientNotFound(id)).into()),
            StatusCode::NOT_FOUND
        );
    }
}
