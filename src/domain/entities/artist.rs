//! Artist entity and repository trait.
//!
//! Maps to the `artists` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::ListQuery;
use crate::shared::error::AppError;

/// A performing artist.
///
/// Maps to the `artists` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - name: VARCHAR(200) NOT NULL
/// - slug: VARCHAR(120) NOT NULL UNIQUE
/// - bio: TEXT NULL
/// - country: CHAR(2) NULL (ISO-3166 alpha-2)
/// - website_url: TEXT NULL
/// - created_at / updated_at: TIMESTAMPTZ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    /// Snowflake ID (primary key)
    pub id: i64,

    pub name: String,

    /// URL-safe unique identifier
    pub slug: String,

    pub bio: Option<String>,

    /// Upper-case ISO-3166 alpha-2 code
    pub country: Option<String>,

    pub website_url: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Artist {
    pub fn new(id: i64, name: String, slug: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            slug,
            bio: None,
            country: None,
            website_url: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Artist reference embedded in groups, tracks and releases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistSummary {
    pub artist_id: i64,
    pub name: String,
    pub slug: String,
}

/// Repository trait for Artist data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArtistRepository: Send + Sync {
    /// Find an artist by Snowflake ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<Artist>, AppError>;

    /// Find an artist by slug.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Artist>, AppError>;

    /// Fetch all artists whose ID is in `ids`. Missing IDs are skipped.
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Artist>, AppError>;

    /// Fetch all artists whose slug is in `slugs`.
    async fn find_by_slugs(&self, slugs: &[String]) -> Result<Vec<Artist>, AppError>;

    /// One page of artists plus the total match count.
    async fn list(&self, query: &ListQuery) -> Result<(Vec<Artist>, i64), AppError>;

    async fn create(&self, artist: &Artist) -> Result<Artist, AppError>;

    async fn update(&self, artist: &Artist) -> Result<Artist, AppError>;

    /// Delete an artist. Returns `false` when nothing was deleted.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_artist_has_no_optional_fields() {
        let artist = Artist::new(1, "Björk".into(), "bjork".into());
        assert!(artist.bio.is_none());
        assert!(artist.country.is_none());
        assert_eq!(artist.created_at, artist.updated_at);
    }

    #[test]
    fn test_artist_serialization() {
        let artist = Artist::new(42, "Air".into(), "air".into());
        let json = serde_json::to_value(&artist).unwrap();
        assert_eq!(json["slug"], "air");
        assert!(json["bio"].is_null());
    }
}
