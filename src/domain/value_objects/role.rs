//! User roles.
//!
//! Roles are ordered: `Viewer < Editor < Admin`. A check for a role passes
//! for that role and every role above it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role assigned to a user account.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Read-only access to catalog data and own profile
    #[default]
    Viewer,
    /// Create and edit catalog records, upload media
    Editor,
    /// Everything, including user and banner management
    Admin,
}

impl UserRole {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "viewer" => Some(Self::Viewer),
            "editor" => Some(Self::Editor),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Editor => "editor",
            Self::Admin => "admin",
        }
    }

    /// Whether this role grants at least `required`.
    pub fn allows(&self, required: UserRole) -> bool {
        *self >= required
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(UserRole::Admin.allows(UserRole::Editor));
        assert!(UserRole::Editor.allows(UserRole::Editor));
        assert!(UserRole::Editor.allows(UserRole::Viewer));
        assert!(!UserRole::Viewer.allows(UserRole::Editor));
        assert!(!UserRole::Editor.allows(UserRole::Admin));
    }

    #[test]
    fn test_from_str() {
        assert_eq!(UserRole::from_str("ADMIN"), Some(UserRole::Admin));
        assert_eq!(UserRole::from_str("editor"), Some(UserRole::Editor));
        assert_eq!(UserRole::from_str("owner"), None);
    }

    #[test]
    fn test_default_is_viewer() {
        assert_eq!(UserRole::default(), UserRole::Viewer);
    }
}
