//! # Error Handling
//!
//! Unified problem+json error responses with trace ID propagation, plus the
//! repository error type and the mapping of tenant isolation failures.

use axum::{
    extract::rejection::JsonRejection,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;

use crate::tenancy::ScopeError;
use crate::telemetry;

/// Unified API error response structure
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiError {
    /// HTTP status code for the response
    #[serde(skip_serializing, skip_deserializing)]
    pub status: StatusCode,
    /// Error code for programmatic handling
    pub code: Box<str>,
    /// Human-readable error message
    pub message: Box<str>,
    /// Additional error details (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Box<serde_json::Value>>,
    /// Suggested retry delay in seconds (optional)
    pub retry_after: Option<u64>,
    /// Correlation trace ID for debugging (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<Box<str>>,
}

impl ApiError {
    /// Create a new API error with the given status code and message
    pub fn new<S: Into<String>>(status: StatusCode, code: S, message: S) -> Self {
        Self {
            status,
            code: code.into().into_boxed_str(),
            message: message.into().into_boxed_str(),
            details: None,
            retry_after: None,
            trace_id: Self::current_trace_id(),
        }
    }

    /// Add details to the error
    pub fn with_details<V: Into<serde_json::Value>>(mut self, details: V) -> Self {
        self.details = Some(Box::new(details.into()));
        self
    }

    /// Set retry after delay
    pub fn with_retry_after(mut self, seconds: u64) -> Self {
        self.retry_after = Some(seconds);
        self
    }

    /// Extract current trace ID from the active tracing span (falls back to generated correlation ID)
    fn current_trace_id() -> Option<Box<str>> {
        telemetry::current_trace_id()
            .map(|trace_id| trace_id.into_boxed_str())
            .or_else(|| {
                // Fallback: generate a correlation ID for basic client-server log correlation
                Some(format!("corr-{}", &uuid::Uuid::new_v4().to_string()[..8]).into_boxed_str())
            })
    }
}

/// Database error code of a failed statement, if the driver reported one.
fn sql_state(error: &sea_orm::DbErr) -> Option<String> {
    use sea_orm::RuntimeErr;

    let (sea_orm::DbErr::Query(RuntimeErr::SqlxError(sqlx_err))
    | sea_orm::DbErr::Exec(RuntimeErr::SqlxError(sqlx_err))) = error
    else {
        return None;
    };

    sqlx_err
        .as_database_error()
        .and_then(|db_error| db_error.code())
        .map(|code| code.into_owned())
}

/// Postgres `23505`, or SQLite's primary key / unique constraint codes.
fn is_unique_violation(error: &sea_orm::DbErr) -> bool {
    matches!(
        error.sql_err(),
        Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
    ) || sql_state(error).is_some_and(|code| matches!(code.as_str(), "23505" | "1555" | "2067"))
}

/// Postgres `23503`, or SQLite's foreign key constraint code.
fn is_foreign_key_violation(error: &sea_orm::DbErr) -> bool {
    matches!(
        error.sql_err(),
        Some(sea_orm::SqlErr::ForeignKeyConstraintViolation(_))
    ) || sql_state(error).is_some_and(|code| matches!(code.as_str(), "23503" | "787"))
}

fn internal_error(message: &str) -> ApiError {
    ApiError::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_SERVER_ERROR",
        message,
    )
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert(
            "content-type",
            HeaderValue::from_static("application/problem+json"),
        );

        if let Some(retry_after) = self.retry_after
            && let Ok(header_value) = HeaderValue::from_str(&retry_after.to_string())
        {
            headers.insert("retry-after", header_value);
        }

        (self.status, headers, axum::Json(self)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        tracing::error!(error = ?error, "Internal error");
        internal_error("An internal error occurred")
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let message = match rejection {
            JsonRejection::JsonDataError(err) => format!("Invalid JSON: {}", err),
            JsonRejection::JsonSyntaxError(err) => format!("JSON syntax error: {}", err),
            JsonRejection::MissingJsonContentType(_) => {
                "Missing 'Content-Type: application/json' header".to_string()
            }
            _ => "Invalid request body".to_string(),
        };

        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", &message)
    }
}

impl From<sea_orm::DbErr> for ApiError {
    fn from(error: sea_orm::DbErr) -> Self {
        if is_unique_violation(&error) {
            tracing::debug!(?error, "Unique constraint violation");
            return Self::new(StatusCode::CONFLICT, "CONFLICT", "Resource already exists");
        }
        if is_foreign_key_violation(&error) {
            tracing::debug!(?error, "Foreign key violation");
            return Self::new(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "Referenced tenant or record does not exist",
            );
        }

        match &error {
            sea_orm::DbErr::RecordNotFound(record) => Self::new(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                &format!("Record not found: {}", record),
            ),
            sea_orm::DbErr::RecordNotUpdated => {
                Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", "Record not found")
            }
            sea_orm::DbErr::Conn(_) | sea_orm::DbErr::ConnectionAcquire(_) => {
                tracing::error!(error = %error, "Database connection error");
                Self::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_UNAVAILABLE",
                    "Database service unavailable",
                )
                .with_retry_after(5)
            }
            _ => {
                tracing::error!(error = ?error, "Database error");
                internal_error("Database error occurred")
            }
        }
    }
}

/// Create a validation error with field details
pub fn validation_error(message: &str, field_errors: serde_json::Value) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", message).with_details(field_errors)
}

const TENANT_REQUIRED_MESSAGE: &str = "An active tenant is required for this operation";

/// 400 for a route that needs a tenant but got none through `header`.
pub fn tenant_required(header: &str) -> ApiError {
    ApiError::new(
        StatusCode::BAD_REQUEST,
        "TENANT_REQUIRED",
        TENANT_REQUIRED_MESSAGE,
    )
    .with_details(json!({ "header": header }))
}

impl From<ScopeError> for ApiError {
    fn from(error: ScopeError) -> Self {
        match error {
            ScopeError::Unscoped { collection, access } => ApiError::new(
                StatusCode::BAD_REQUEST,
                "TENANT_REQUIRED",
                TENANT_REQUIRED_MESSAGE,
            )
            .with_details(json!({
                "collection": collection,
                "access": access,
            })),
            ScopeError::CrossTenantReference {
                field,
                expected,
                found,
            } => ApiError::new(
                StatusCode::BAD_REQUEST,
                "CROSS_TENANT_REFERENCE",
                "Referenced record belongs to a different tenant",
            )
            .with_details(json!({
                "field": field,
                "expected_tenant_id": expected,
                "found_tenant_id": found,
            })),
            ScopeError::NotFound { collection, id } => ApiError::new(
                StatusCode::NOT_FOUND,
                "NOT_FOUND".to_string(),
                format!("{collection} {id} not found"),
            ),
            ScopeError::TenantMismatch { .. }
            | ScopeError::ImmutableTenant { .. }
            | ScopeError::Invalid(_) => {
                tracing::error!(error = %error, "Tenant integrity violation");
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "TENANT_INTEGRITY_VIOLATION",
                    "Tenant integrity check failed",
                )
            }
            ScopeError::Db(db_err) => db_err.into(),
        }
    }
}

/// Errors returned by repositories.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation failed: {message}")]
    Validation {
        message: String,
        field: Option<&'static str>,
    },
    #[error(transparent)]
    Scope(#[from] ScopeError),
    #[error("database error: {0}")]
    Database(#[source] sea_orm::DbErr),
}

impl RepositoryError {
    pub fn database_error(error: sea_orm::DbErr) -> Self {
        Self::Database(error)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
        }
    }

    pub fn invalid_field(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field),
        }
    }
}

impl From<sea_orm::DbErr> for RepositoryError {
    fn from(error: sea_orm::DbErr) -> Self {
        Self::Database(error)
    }
}

impl From<RepositoryError> for ApiError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound(what) => ApiError::new(
                StatusCode::NOT_FOUND,
                "NOT_FOUND".to_string(),
                format!("{what} not found"),
            ),
            RepositoryError::Validation { message, field } => match field {
                Some(field) => validation_error(&message, json!({ "field": field })),
                None => ApiError::new(
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_FAILED".to_string(),
                    message,
                ),
            },
            RepositoryError::Scope(scope) => scope.into(),
            RepositoryError::Database(db_err) => db_err.into(),
        }
    }
}
