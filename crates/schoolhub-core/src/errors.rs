//! Application error type with HTTP response conversion.
//!
//! Every service returns [`AppError`]. The [`ErrorKind`] is stable and is
//! serialized into the response body so clients can branch on it without
//! parsing messages.

use std::fmt;

use anyhow::{Error, anyhow};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use sqlx::error::DatabaseError;
use tracing::{error, warn};
use utoipa::ToSchema;
use validator::ValidationErrors;

const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";
const QUERY_CANCELED: &str = "57014";

const INTERNAL_MESSAGE: &str = "Internal server error";
const TRANSACTION_MESSAGE: &str = "The operation could not be completed, please retry";

/// Stable error taxonomy exposed to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
    Forbidden,
    Unauthorized,
    /// Storage-level commit failure. Nothing was committed, retrying is safe.
    Transaction,
    Internal,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Conflict => StatusCode::CONFLICT,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Transaction => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Conflict => "conflict",
            Self::NotFound => "not_found",
            Self::Forbidden => "forbidden",
            Self::Unauthorized => "unauthorized",
            Self::Transaction => "transaction",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON body returned for every failed request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: ErrorKind,
    /// Offending fields, present for conflicts and validation failures.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}

#[derive(Debug)]
pub struct AppError {
    pub kind: ErrorKind,
    pub error: Error,
    pub fields: Vec<String>,
}

impl AppError {
    pub fn new<E>(kind: ErrorKind, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            kind,
            error: err.into(),
            fields: Vec::new(),
        }
    }

    pub fn validation<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Validation, err)
    }

    /// Validation failure on a single named field.
    pub fn invalid_field(field: &str, message: impl fmt::Display) -> Self {
        Self::validation(anyhow!("{}", message)).with_fields([field])
    }

    pub fn conflict<E, I, S>(err: E, fields: I) -> Self
    where
        E: Into<Error>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(ErrorKind::Conflict, err).with_fields(fields)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::NotFound, err)
    }

    pub fn forbidden<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Forbidden, err)
    }

    pub fn unauthorized<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Unauthorized, err)
    }

    pub fn transaction<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Transaction, err)
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Internal, err)
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn status(&self) -> StatusCode {
        self.kind.status()
    }

    fn from_database_error(db_err: Box<dyn DatabaseError>) -> Self {
        if db_err.is_unique_violation() {
            let fields = constraint_fields(db_err.as_ref());
            let message = if fields.is_empty() {
                "Duplicate value".to_string()
            } else {
                format!("Duplicate value for: {}", fields.join(", "))
            };
            return Self::conflict(anyhow!(message), fields);
        }

        if db_err.is_foreign_key_violation() {
            let fields = constraint_fields(db_err.as_ref());
            return Self::conflict(
                anyhow!("Record is referenced by or references a missing record"),
                fields,
            );
        }

        let code = db_err.code().map(|c| c.into_owned());
        match code.as_deref() {
            Some(SERIALIZATION_FAILURE | DEADLOCK_DETECTED | QUERY_CANCELED) => {
                Self::transaction(anyhow!(
                    "{} ({})",
                    db_err.message(),
                    code.as_deref().unwrap_or_default()
                ))
            }
            _ => Self::internal(sqlx::Error::Database(db_err)),
        }
    }
}

/// Derives the colliding field name from a constraint such as
/// `users_email_key` or `parents_parent_code_key`.
fn constraint_fields(db_err: &dyn DatabaseError) -> Vec<String> {
    let Some(constraint) = db_err.constraint() else {
        return Vec::new();
    };

    let trimmed = constraint
        .strip_suffix("_key")
        .or_else(|| constraint.strip_suffix("_fkey"))
        .or_else(|| constraint.strip_suffix("_idx"))
        .unwrap_or(constraint);

    let field = db_err
        .table()
        .and_then(|table| trimmed.strip_prefix(table))
        .map(|rest| rest.trim_start_matches('_'))
        .filter(|rest| !rest.is_empty())
        .unwrap_or(trimmed);

    vec![field.to_string()]
}

/// Joins validator messages into one human readable line.
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                error
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect();
    messages.sort();
    messages.join(", ")
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.error)
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::not_found(anyhow!("Record not found")),
            sqlx::Error::PoolTimedOut => {
                Self::transaction(anyhow!("Timed out waiting for a database connection"))
            }
            sqlx::Error::Database(db_err) => Self::from_database_error(db_err),
            other => Self::internal(other),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|field| field.to_string())
            .collect();
        fields.sort();
        Self::validation(anyhow!("{}", format_validation_errors(&errors))).with_fields(fields)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self.kind {
            ErrorKind::Internal => {
                error!(error = ?self.error, "Internal server error");
                INTERNAL_MESSAGE.to_string()
            }
            ErrorKind::Transaction => {
                warn!(error = %self.error, "Transaction aborted");
                TRANSACTION_MESSAGE.to_string()
            }
            _ => self.error.to_string(),
        };

        let body = Json(ErrorResponse {
            error: message,
            kind: self.kind,
            fields: self.fields,
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    async fn body_of(err: AppError) -> (StatusCode, ErrorResponse) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_kind_status_mapping() {
        assert_eq!(ErrorKind::Validation.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorKind::Conflict.status(), StatusCode::CONFLICT);
        assert_eq!(ErrorKind::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorKind::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorKind::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ErrorKind::Transaction.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ErrorKind::Internal.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_conflict_reports_fields() {
        let err = AppError::conflict(anyhow!("Email already exists"), ["email"]);
        let (status, body) = body_of(err).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.kind, ErrorKind::Conflict);
        assert_eq!(body.error, "Email already exists");
        assert_eq!(body.fields, vec!["email".to_string()]);
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let err = AppError::internal(anyhow!("connection refused at 10.0.0.3"));
        let (status, body) = body_of(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, INTERNAL_MESSAGE);
        assert!(body.fields.is_empty());
    }

    #[tokio::test]
    async fn test_transaction_error_is_generic() {
        let err = AppError::transaction(anyhow!("could not serialize access"));
        let (status, body) = body_of(err).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.kind, ErrorKind::Transaction);
        assert_eq!(body.error, TRANSACTION_MESSAGE);
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[test]
    fn test_pool_timeout_maps_to_transaction() {
        let err: AppError = sqlx::Error::PoolTimedOut.into();
        assert_eq!(err.kind, ErrorKind::Transaction);
    }

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "name is required"))]
        name: String,
        #[validate(range(min = 1))]
        count: i32,
    }

    #[test]
    fn test_validation_errors_conversion() {
        let sample = Sample {
            name: String::new(),
            count: 0,
        };
        let err: AppError = sample.validate().unwrap_err().into();

        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.fields, vec!["count".to_string(), "name".to_string()]);
        let message = err.error.to_string();
        assert!(message.contains("name is required"));
        assert!(message.contains("count is invalid"));
    }

    #[test]
    fn test_invalid_field_sets_field() {
        let err = AppError::invalid_field("username", "username cannot be empty");
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.fields, vec!["username".to_string()]);
        assert_eq!(err.error.to_string(), "username cannot be empty");
    }

    #[test]
    fn test_display_includes_kind() {
        let err = AppError::not_found(anyhow!("Class not found"));
        assert_eq!(err.to_string(), "not_found: Class not found");
    }
}
