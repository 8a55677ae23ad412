//! Validation Utilities

use validator::{Validate, ValidationErrors};

use super::error::{AppError, FieldError};

/// Convert validation errors to AppError
pub fn validation_error(errors: ValidationErrors) -> AppError {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| FieldError {
                field: field.to_string(),
                message: e
                    .message
                    .clone()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("invalid value ({})", e.code)),
            })
        })
        .collect();

    // HashMap iteration order is unstable
    fields.sort_by(|a, b| a.field.cmp(&b.field));

    let message = fields
        .first()
        .map(|e| format!("{}: {}", e.field, e.message))
        .unwrap_or_else(|| "Validation failed".into());

    AppError::Validation { message, fields }
}

/// Run `validator` rules on a request body.
pub fn validate_request<T: Validate>(body: &T) -> Result<(), AppError> {
    body.validate().map_err(validation_error)
}

/// Treat an empty (or whitespace) string as "clear this field".
///
/// PATCH bodies use `Some("")` to reset optional text columns.
pub fn normalize_optional(value: Option<String>) -> Option<Option<String>> {
    value.map(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Trim an optional text input, mapping blank input to `None`.
pub fn trimmed(value: Option<String>) -> Option<String> {
    normalize_optional(value).flatten()
}

/// Validator for URL-ish fields that also accepts an empty string.
pub fn url_or_empty(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() || value.starts_with("https://") || value.starts_with("http://") {
        Ok(())
    } else {
        let mut err = validator::ValidationError::new("url");
        err.message = Some("Must be an http(s) URL".into());
        Err(err)
    }
}
