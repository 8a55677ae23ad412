//! Release entity and repository trait.
//!
//! Maps to the `releases` table. The tracklist lives in `release_tracks`
//! and credited artists in `release_artists`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::ArtistSummary;
use crate::domain::value_objects::ListQuery;
use crate::shared::error::AppError;

/// Kind of release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseType {
    #[default]
    Album,
    Single,
    Ep,
    Compilation,
}

impl ReleaseType {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "album" => Some(Self::Album),
            "single" => Some(Self::Single),
            "ep" => Some(Self::Ep),
            "compilation" => Some(Self::Compilation),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Album => "album",
            Self::Single => "single",
            Self::Ep => "ep",
            Self::Compilation => "compilation",
        }
    }
}

impl std::fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An album, single, EP or compilation.
///
/// Maps to the `releases` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - title: VARCHAR(300) NOT NULL
/// - slug: VARCHAR(120) NOT NULL UNIQUE
/// - release_type: VARCHAR(16) NOT NULL
/// - release_date: DATE NULL
/// - label: VARCHAR(200) NULL
/// - description: TEXT NULL
/// - published: BOOLEAN NOT NULL DEFAULT FALSE
/// - created_at / updated_at: TIMESTAMPTZ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub release_type: ReleaseType,
    pub release_date: Option<NaiveDate>,
    pub label: Option<String>,
    pub description: Option<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Release {
    pub fn new(id: i64, title: String, slug: String, release_type: ReleaseType) -> Self {
        let now = Utc::now();
        Self {
            id,
            title,
            slug,
            release_type,
            release_date: None,
            label: None,
            description: None,
            published: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Tracklist entry joined with the track it points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseTrack {
    pub track_id: i64,
    pub title: String,
    pub slug: String,
    pub duration_ms: Option<i32>,
    pub disc_number: i32,
    /// 1-based position within the disc
    pub position: i32,
}

/// Tracklist entry used when replacing a release's tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReleaseTrack {
    pub track_id: i64,
    pub disc_number: i32,
    pub position: i32,
}

/// Repository trait for Release data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReleaseRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Release>, AppError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Release>, AppError>;

    async fn list(&self, query: &ListQuery) -> Result<(Vec<Release>, i64), AppError>;

    async fn create(&self, release: &Release) -> Result<Release, AppError>;

    async fn update(&self, release: &Release) -> Result<Release, AppError>;

    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Tracklist ordered by disc then position.
    async fn tracks(&self, release_id: i64) -> Result<Vec<ReleaseTrack>, AppError>;

    /// Replace the tracklist atomically.
    async fn set_tracks(
        &self,
        release_id: i64,
        tracks: &[NewReleaseTrack],
    ) -> Result<Vec<ReleaseTrack>, AppError>;

    /// Credited artists in position order.
    async fn artists(&self, release_id: i64) -> Result<Vec<ArtistSummary>, AppError>;

    /// Replace credited artists atomically. Positions follow slice order.
    async fn set_artists(
        &self,
        release_id: i64,
        artist_ids: &[i64],
    ) -> Result<Vec<ArtistSummary>, AppError>;
}
