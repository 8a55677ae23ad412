//! Image entity and repository trait.
//!
//! Images are ordered galleries attached to artists, groups, releases or
//! user profiles. Maps to the `images` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Kind of record an image belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageOwner {
    Artist,
    Group,
    Release,
    Profile,
}

impl ImageOwner {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "artist" => Some(Self::Artist),
            "group" => Some(Self::Group),
            "release" => Some(Self::Release),
            "profile" => Some(Self::Profile),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Artist => "artist",
            Self::Group => "group",
            Self::Release => "release",
            Self::Profile => "profile",
        }
    }
}

impl std::fmt::Display for ImageOwner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An uploaded image registered against an owner.
///
/// Maps to the `images` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - owner_kind: VARCHAR(16) NOT NULL
/// - owner_id: BIGINT NOT NULL
/// - storage_key: TEXT NOT NULL UNIQUE
/// - url: TEXT NOT NULL
/// - alt_text: TEXT NULL
/// - width / height: INTEGER NULL
/// - content_type: VARCHAR(64) NOT NULL
/// - size_bytes: BIGINT NOT NULL
/// - position: INTEGER NOT NULL (1-based within the owner)
/// - created_at: TIMESTAMPTZ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: i64,
    pub owner_kind: ImageOwner,
    pub owner_id: i64,
    pub storage_key: String,
    /// CDN URL
    pub url: String,
    pub alt_text: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub content_type: String,
    pub size_bytes: i64,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

/// Repository trait for Image data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Image>, AppError>;

    /// Images of one owner ordered by position.
    async fn list_for_owner(&self, owner: ImageOwner, owner_id: i64) -> Result<Vec<Image>, AppError>;

    /// Whether the owning record exists.
    async fn owner_exists(&self, owner: ImageOwner, owner_id: i64) -> Result<bool, AppError>;

    /// Insert an image at the end of its owner's list. The stored
    /// position is returned in the result.
    async fn create(&self, image: &Image) -> Result<Image, AppError>;

    /// Delete an image and close the gap in its owner's positions.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Rewrite positions 1..n in the order given, in one transaction.
    async fn reorder(
        &self,
        owner: ImageOwner,
        owner_id: i64,
        ordered_ids: &[i64],
    ) -> Result<Vec<Image>, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_from_str() {
        assert_eq!(ImageOwner::from_str("Artist"), Some(ImageOwner::Artist));
        assert_eq!(ImageOwner::from_str("profile"), Some(ImageOwner::Profile));
        assert_eq!(ImageOwner::from_str("track"), None);
    }

    #[test]
    fn test_owner_serde() {
        assert_eq!(serde_json::to_string(&ImageOwner::Release).unwrap(), "\"release\"");
    }
}
