//! URL slugs for catalog records.
//!
//! A canonical slug is non-empty lowercase ASCII alphanumerics separated by
//! single hyphens, at most [`MAX_SLUG_LEN`] bytes long.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum slug length in bytes.
pub const MAX_SLUG_LEN: usize = 120;

/// A validated URL slug.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

/// Reasons a slug is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlugError {
    #[error("slug must not be empty")]
    Empty,

    #[error("slug must be at most {MAX_SLUG_LEN} characters")]
    TooLong,

    #[error("slug may only contain lowercase letters, digits and single hyphens")]
    InvalidFormat,
}

impl Slug {
    /// Validate an explicit slug. It must already be canonical.
    pub fn parse(value: &str) -> Result<Self, SlugError> {
        if value.is_empty() {
            return Err(SlugError::Empty);
        }
        if value.len() > MAX_SLUG_LEN {
            return Err(SlugError::TooLong);
        }
        let valid_chars = value
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
        if !valid_chars
            || value.starts_with('-')
            || value.ends_with('-')
            || value.contains("--")
        {
            return Err(SlugError::InvalidFormat);
        }
        Ok(Self(value.to_string()))
    }

    /// Derive a slug from a display name.
    ///
    /// Returns `None` when the name has no ASCII alphanumerics at all.
    pub fn from_name(name: &str) -> Option<Self> {
        let mut out = String::with_capacity(name.len());
        let mut pending_dash = false;

        for c in name.chars() {
            let c = fold_accent(c);
            if c.is_ascii_alphanumeric() {
                if pending_dash && !out.is_empty() {
                    out.push('-');
                }
                pending_dash = false;
                out.push(c.to_ascii_lowercase());
            } else if c == '\'' || c == '\u{2019}' {
                // "Don't" -> "dont"
            } else {
                pending_dash = true;
            }
        }

        if out.is_empty() {
            return None;
        }
        if out.len() > MAX_SLUG_LEN {
            out.truncate(MAX_SLUG_LEN);
            while out.ends_with('-') {
                out.pop();
            }
        }
        Some(Self(out))
    }

    /// Slug with a numeric suffix, used to resolve collisions (`name-2`).
    pub fn with_suffix(&self, n: u32) -> Self {
        let suffix = format!("-{}", n);
        let mut base = self.0.clone();
        if base.len() + suffix.len() > MAX_SLUG_LEN {
            base.truncate(MAX_SLUG_LEN - suffix.len());
            while base.ends_with('-') {
                base.pop();
            }
        }
        Self(base + &suffix)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Map common Latin accented letters to their ASCII base letter.
fn fold_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'a',
        'ç' | 'Ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' | 'È' | 'É' | 'Ê' | 'Ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' | 'Ì' | 'Í' | 'Î' | 'Ï' => 'i',
        'ñ' | 'Ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' => 'o',
        'ù' | 'ú' | 'û' | 'ü' | 'Ù' | 'Ú' | 'Û' | 'Ü' => 'u',
        'ý' | 'ÿ' | 'Ý' => 'y',
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("Daft Punk", "daft-punk")]
    #[test_case("  AC/DC  ", "ac-dc")]
    #[test_case("Beyoncé", "beyonce")]
    #[test_case("Don't Stop Me Now", "dont-stop-me-now")]
    #[test_case("Sigur Rós -- Live!!", "sigur-ros-live")]
    #[test_case("2Pac", "2pac")]
    fn test_from_name(name: &str, expected: &str) {
        assert_eq!(Slug::from_name(name).unwrap().as_str(), expected);
    }

    #[test]
    fn test_from_name_without_alphanumerics() {
        assert!(Slug::from_name("!!!").is_none());
        assert!(Slug::from_name("日本").is_none());
    }

    #[test]
    fn test_from_name_truncates() {
        let long = "ab ".repeat(100);
        let slug = Slug::from_name(&long).unwrap();
        assert!(slug.as_str().len() <= MAX_SLUG_LEN);
        assert!(!slug.as_str().ends_with('-'));
    }

    #[test_case("daft-punk" ; "plain")]
    #[test_case("a1" ; "digits")]
    fn test_parse_accepts_canonical(value: &str) {
        assert_eq!(Slug::parse(value).unwrap().as_str(), value);
    }

    #[test_case("", SlugError::Empty ; "empty")]
    #[test_case("Daft-Punk", SlugError::InvalidFormat ; "uppercase")]
    #[test_case("-lead", SlugError::InvalidFormat ; "leading dash")]
    #[test_case("double--dash", SlugError::InvalidFormat ; "double dash")]
    #[test_case("with space", SlugError::InvalidFormat ; "space")]
    fn test_parse_rejects(value: &str, expected: SlugError) {
        assert_eq!(Slug::parse(value).unwrap_err(), expected);
    }

    #[test]
    fn test_parse_rejects_too_long() {
        assert_eq!(Slug::parse(&"a".repeat(121)).unwrap_err(), SlugError::TooLong);
    }

    #[test]
    fn test_with_suffix() {
        let slug = Slug::parse("intro").unwrap();
        assert_eq!(slug.with_suffix(2).as_str(), "intro-2");

        let long = Slug::parse(&"a".repeat(MAX_SLUG_LEN)).unwrap();
        let suffixed = long.with_suffix(12);
        assert_eq!(suffixed.as_str().len(), MAX_SLUG_LEN);
        assert!(suffixed.as_str().ends_with("-12"));
    }
}
