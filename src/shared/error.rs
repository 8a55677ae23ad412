//! Application Error Types
//!
//! Centralized error handling with Axum integration.
//!
//! Every error response carries a JSON body of the shape
//! `{ "error": "<message>" }`; validation failures additionally list the
//! offending fields.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rate limited")]
    RateLimited { retry_after: u64 },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        fields: Vec<FieldError>,
    },

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    /// Validation failure without field details.
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// HTTP status this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Database(e) => database_status(e),
        }
    }
}

/// Classify a sqlx error into the status a client should see.
fn database_status(error: &sqlx::Error) -> StatusCode {
    match error {
        sqlx::Error::RowNotFound => StatusCode::NOT_FOUND,
        sqlx::Error::Database(db_err)
            if db_err.is_unique_violation() || db_err.is_foreign_key_violation() =>
        {
            StatusCode::CONFLICT
        }
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::WorkerCrashed => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldError>>,
}

/// Field-level validation error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let (message, fields) = match self {
            AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::Conflict(msg) => (msg, None),
            AppError::RateLimited { retry_after } => {
                let body = ErrorResponse {
                    error: "Too many requests, please slow down".into(),
                    fields: None,
                };
                let mut response = (status, Json(body)).into_response();
                if let Ok(v) = HeaderValue::from_str(&retry_after.to_string()) {
                    response.headers_mut().insert(header::RETRY_AFTER, v);
                }
                return response;
            }
            AppError::Validation { message, fields } => {
                (message, (!fields.is_empty()).then_some(fields))
            }
            AppError::ServiceUnavailable(msg) => {
                tracing::warn!("Service unavailable: {}", msg);
                (msg, None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("Internal server error".into(), None)
            }
            AppError::Database(e) => match status {
                StatusCode::NOT_FOUND => ("Not found".into(), None),
                StatusCode::CONFLICT => {
                    tracing::debug!("Constraint violation: {}", e);
                    ("Conflicts with an existing record".into(), None)
                }
                StatusCode::SERVICE_UNAVAILABLE => {
                    tracing::error!("Database unavailable: {}", e);
                    ("Database unavailable".into(), None)
                }
                _ => {
                    tracing::error!("Database error: {}", e);
                    ("Internal server error".into(), None)
                }
            },
        };

        (status, Json(ErrorResponse { error: message, fields })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use test_case::test_case;

    async fn body_json(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test_case(AppError::NotFound("x".into()), StatusCode::NOT_FOUND ; "not found")]
    #[test_case(AppError::Conflict("x".into()), StatusCode::CONFLICT ; "conflict")]
    #[test_case(AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST ; "bad request")]
    #[test_case(AppError::validation("x"), StatusCode::BAD_REQUEST ; "validation")]
    #[test_case(AppError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED ; "unauthorized")]
    #[test_case(AppError::Forbidden("x".into()), StatusCode::FORBIDDEN ; "forbidden")]
    #[test_case(AppError::ServiceUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE ; "unavailable")]
    #[test_case(AppError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR ; "internal")]
    fn test_status_mapping(error: AppError, expected: StatusCode) {
        assert_eq!(error.status_code(), expected);
    }

    #[test]
    fn test_pool_timeout_is_service_unavailable() {
        let error = AppError::Database(sqlx::Error::PoolTimedOut);
        assert_eq!(error.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_row_not_found_is_not_found() {
        let error = AppError::Database(sqlx::Error::RowNotFound);
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_body_has_error_field() {
        let (status, json) = body_json(AppError::NotFound("Group not found".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json, serde_json::json!({ "error": "Group not found" }));
    }

    #[tokio::test]
    async fn test_internal_message_is_hidden() {
        let (_, json) = body_json(AppError::Internal("secret stack trace".into())).await;
        assert_eq!(json["error"], "Internal server error");
    }

    #[tokio::test]
    async fn test_database_unavailable_message() {
        let (status, json) = body_json(AppError::Database(sqlx::Error::PoolClosed)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["error"], "Database unavailable");
    }

    #[tokio::test]
    async fn test_validation_lists_fields() {
        let error = AppError::Validation {
            message: "name: too long".into(),
            fields: vec![FieldError {
                field: "name".into(),
                message: "too long".into(),
            }],
        };
        let (_, json) = body_json(error).await;
        assert_eq!(json["fields"][0]["field"], "name");
    }

    #[test]
    fn test_rate_limited_sets_retry_after() {
        let response = AppError::RateLimited { retry_after: 12 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "12");
    }
}
