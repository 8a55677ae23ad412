//! Rules shared by the catalog services: slug assignment, relation list
//! checks and the common error type.

use std::collections::HashSet;

use crate::domain::{Slug, SlugError};
use crate::shared::error::AppError;

/// Catalog service errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("A {0} with this slug already exists")]
    SlugTaken(&'static str),

    #[error("slug: {0}")]
    InvalidSlug(#[from] SlugError),

    #[error("slug: cannot be derived from this name, provide one")]
    Unsluggable,

    /// A relation list names a record that does not exist
    #[error("{0}")]
    UnknownReference(String),

    /// A relation list names the same record twice
    #[error("{0}")]
    DuplicateReference(String),

    #[error("{0}")]
    Invalid(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Forbidden(&'static str),

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(_) => AppError::NotFound(err.to_string()),
            CatalogError::SlugTaken(_) | CatalogError::Conflict(_) => {
                AppError::Conflict(err.to_string())
            }
            CatalogError::InvalidSlug(_) | CatalogError::Unsluggable => {
                AppError::validation(err.to_string())
            }
            CatalogError::UnknownReference(msg)
            | CatalogError::DuplicateReference(msg)
            | CatalogError::Invalid(msg) => AppError::BadRequest(msg),
            CatalogError::Forbidden(msg) => AppError::Forbidden(msg.to_string()),
            CatalogError::Store(inner) => inner,
        }
    }
}

/// Explicit slug when given (must be canonical), otherwise derived from
/// the display name. A blank explicit slug counts as absent.
pub fn resolve_slug(explicit: Option<&str>, name: &str) -> Result<Slug, CatalogError> {
    match explicit.map(str::trim).filter(|s| !s.is_empty()) {
        Some(slug) => Ok(Slug::parse(slug)?),
        None => Slug::from_name(name).ok_or(CatalogError::Unsluggable),
    }
}

/// Reject relation lists that name the same ID twice.
pub fn ensure_distinct(ids: &[i64], what: &str) -> Result<(), CatalogError> {
    let mut seen = HashSet::with_capacity(ids.len());
    match ids.iter().find(|id| !seen.insert(**id)) {
        Some(id) => Err(CatalogError::DuplicateReference(format!(
            "Duplicate {} in list: {}",
            what, id
        ))),
        None => Ok(()),
    }
}

/// Check that every requested ID was found. `found` are the IDs that exist.
pub fn ensure_all_found(
    requested: &[i64],
    found: impl IntoIterator<Item = i64>,
    what: &str,
) -> Result<(), CatalogError> {
    let found: HashSet<i64> = found.into_iter().collect();
    match requested.iter().find(|id| !found.contains(id)) {
        Some(id) => Err(CatalogError::UnknownReference(format!(
            "Unknown {}: {}",
            what, id
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use test_case::test_case;

    #[test_case(None, "Daft Punk", "daft-punk" ; "derived from name")]
    #[test_case(Some("  "), "Sigur Rós", "sigur-ros" ; "blank explicit slug")]
    #[test_case(Some("custom-slug"), "Whatever", "custom-slug" ; "explicit slug")]
    fn test_resolve_slug(explicit: Option<&str>, name: &str, expected: &str) {
        assert_eq!(resolve_slug(explicit, name).unwrap().as_str(), expected);
    }

    #[test]
    fn test_resolve_slug_errors_are_validation() {
        let err = resolve_slug(Some("Not A Slug"), "x").unwrap_err();
        assert_eq!(AppError::from(err).status_code(), StatusCode::BAD_REQUEST);

        let err = resolve_slug(None, "!!!").unwrap_err();
        assert!(matches!(err, CatalogError::Unsluggable));
    }

    #[test]
    fn test_ensure_distinct() {
        assert!(ensure_distinct(&[1, 2, 3], "artist").is_ok());
        let err = ensure_distinct(&[1, 2, 1], "artist").unwrap_err();
        assert_eq!(err.to_string(), "Duplicate artist in list: 1");
    }

    #[test]
    fn test_ensure_all_found() {
        assert!(ensure_all_found(&[1, 2], vec![2, 1], "track").is_ok());
        let err = ensure_all_found(&[1, 2, 3], vec![1, 3], "track").unwrap_err();
        assert_eq!(err.to_string(), "Unknown track: 2");
        assert_eq!(AppError::from(err).status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::from(CatalogError::NotFound("Artist")).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(CatalogError::SlugTaken("track")).status_code(),
            StatusCode::CONFLICT
        );
    }
}
