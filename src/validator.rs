use anyhow::anyhow;
use axum::{
    Json,
    extract::{
        FromRequest, Path, Query, Request,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
};
use schoolhub_core::AppError;
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON body extractor that runs `validator` rules before the handler.
/// Every failure is reported as a validation error.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

fn rejection_to_error(rejection: JsonRejection) -> AppError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            AppError::validation(anyhow!("Expected a JSON body (Content-Type: application/json)"))
        }
        JsonRejection::JsonSyntaxError(_) => AppError::validation(anyhow!("Malformed JSON body")),
        JsonRejection::JsonDataError(err) => {
            let detail = err.body_text();
            if let Some(field) = missing_field(&detail) {
                return AppError::invalid_field(field, format!("{} is required", field));
            }
            match offending_field(&detail) {
                Some(field) => AppError::invalid_field(field, format!("Invalid value for {}", field)),
                None => AppError::validation(anyhow!("Invalid request body: {}", detail)),
            }
        }
        other => AppError::validation(anyhow!("Invalid request body: {}", other.body_text())),
    }
}

/// Pulls the field name out of serde's "missing field `x`" message.
fn missing_field(detail: &str) -> Option<&str> {
    let rest = detail.split_once("missing field `")?.1;
    rest.split_once('`').map(|(field, _)| field)
}

/// Pulls the field path out of a "<path>: <reason>" data error.
fn offending_field(detail: &str) -> Option<&str> {
    let rest = detail.split_once("target type: ")?.1;
    let (field, _) = rest.split_once(": ")?;
    let is_path = !field.is_empty()
        && field
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '[' | ']'));
    is_path.then_some(field)
}

/// Unwraps a `Path` extraction, reporting a malformed id as a validation
/// error instead of axum's plain-text rejection.
pub fn parse_path<T>(path: Result<Path<T>, PathRejection>) -> Result<T, AppError> {
    path.map(|Path(value)| value)
        .map_err(|e| AppError::validation(anyhow!("Invalid path parameter: {}", e.body_text())))
}

/// Same as [`parse_path`] for query strings.
pub fn parse_query<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    query
        .map(|Query(value)| value)
        .map_err(|e| AppError::validation(anyhow!("Invalid query parameters: {}", e.body_text())))
}

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_to_error)?;

        value.validate()?;

        Ok(ValidatedJson(value))
    }
}
