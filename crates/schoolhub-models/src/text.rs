//! Trimming rules shared by every request DTO.
//!
//! Required fields must be non-blank after trimming. Optional patch fields
//! follow "absent leaves unchanged, present must be non-blank": sending an
//! empty string is a validation error, never a way to clear a value.

use schoolhub_core::AppError;

use crate::value_types::Email;

pub fn required(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_field(field, format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

pub fn required_some<T>(field: &str, value: Option<T>) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::invalid_field(field, format!("{} is required", field)))
}

pub fn patch(field: &str, value: Option<String>) -> Result<Option<String>, AppError> {
    match value {
        None => Ok(None),
        Some(v) => {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                Err(AppError::invalid_field(
                    field,
                    format!("{} cannot be empty", field),
                ))
            } else {
                Ok(Some(trimmed.to_string()))
            }
        }
    }
}

/// Optional on create: blank is treated as not provided.
pub fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn email(value: &str) -> Result<Email, AppError> {
    let value = required("email", value)?;
    Email::new(&value).map_err(|err| AppError::invalid_field("email", err))
}

pub fn patch_email(value: Option<String>) -> Result<Option<Email>, AppError> {
    patch("email", value)?
        .map(|v| Email::new(&v).map_err(|err| AppError::invalid_field("email", err)))
        .transpose()
}

pub fn password(value: &str) -> Result<String, AppError> {
    if value.is_empty() {
        return Err(AppError::invalid_field("password", "password is required"));
    }
    schoolhub_core::password::ensure_password_strength(value)?;
    Ok(value.to_string())
}

pub fn patch_password(value: Option<String>) -> Result<Option<String>, AppError> {
    value.map(|v| password(&v)).transpose()
}
