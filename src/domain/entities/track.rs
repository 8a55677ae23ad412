//! Track entity and repository trait.
//!
//! Maps to the `tracks` table; artist credits live in `track_artists`.
//!
//! Tracks follow a create-then-upload lifecycle: the row is inserted with
//! [`AudioStatus::Pending`] and moves to [`AudioStatus::Ready`] once the
//! uploaded audio object is registered with [`TrackRepository::attach_audio`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::ListQuery;
use crate::shared::error::AppError;

/// Upload state of a track's audio file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AudioStatus {
    #[default]
    Pending,
    Ready,
}

impl AudioStatus {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "ready" => Self::Ready,
            _ => Self::Pending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Ready => "ready",
        }
    }
}

/// How an artist is credited on a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TrackCredit {
    #[default]
    Primary,
    Featured,
}

impl TrackCredit {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "primary" => Some(Self::Primary),
            "featured" => Some(Self::Featured),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Featured => "featured",
        }
    }
}

/// A single recording.
///
/// Maps to the `tracks` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - title: VARCHAR(300) NOT NULL
/// - slug: VARCHAR(120) NOT NULL UNIQUE
/// - duration_ms: INTEGER NULL
/// - isrc: CHAR(12) NULL
/// - explicit: BOOLEAN NOT NULL DEFAULT FALSE
/// - audio_status: VARCHAR(16) NOT NULL DEFAULT 'pending'
/// - audio_key / audio_url / mime_type: TEXT NULL
/// - content_hash: CHAR(64) NULL, unique when present
/// - file_size: BIGINT NULL
/// - created_at / updated_at: TIMESTAMPTZ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub duration_ms: Option<i32>,
    /// Upper-case ISRC code
    pub isrc: Option<String>,
    pub explicit: bool,
    pub audio_status: AudioStatus,
    /// Object storage key of the audio file
    pub audio_key: Option<String>,
    /// CDN URL of the audio file
    pub audio_url: Option<String>,
    /// Lower-case SHA-256 hex of the audio file
    pub content_hash: Option<String>,
    pub mime_type: Option<String>,
    pub file_size: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Track {
    /// A new track waiting for its audio upload.
    pub fn new(id: i64, title: String, slug: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            title,
            slug,
            duration_ms: None,
            isrc: None,
            explicit: false,
            audio_status: AudioStatus::Pending,
            audio_key: None,
            audio_url: None,
            content_hash: None,
            mime_type: None,
            file_size: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_audio(&self) -> bool {
        self.audio_status == AudioStatus::Ready && self.audio_key.is_some()
    }
}

/// Audio object registered against a track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackAudio {
    pub key: String,
    pub url: String,
    pub mime_type: String,
    pub file_size: i64,
    pub content_hash: String,
}

/// Artist credit joined with the artist's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackArtist {
    pub artist_id: i64,
    pub name: String,
    pub slug: String,
    pub credit: TrackCredit,
    pub position: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTrackArtist {
    pub artist_id: i64,
    pub credit: TrackCredit,
}

/// Repository trait for Track data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrackRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Track>, AppError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Track>, AppError>;

    /// Find the track owning an audio file with this hash.
    async fn find_by_content_hash(&self, hash: &str) -> Result<Option<Track>, AppError>;

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Track>, AppError>;

    async fn list(&self, query: &ListQuery) -> Result<(Vec<Track>, i64), AppError>;

    async fn create(&self, track: &Track) -> Result<Track, AppError>;

    async fn update(&self, track: &Track) -> Result<Track, AppError>;

    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Record uploaded audio and mark the track ready.
    async fn attach_audio(&self, id: i64, audio: &TrackAudio) -> Result<Track, AppError>;

    /// Credits in position order.
    async fn artists(&self, track_id: i64) -> Result<Vec<TrackArtist>, AppError>;

    /// Replace all credits atomically. Positions follow slice order.
    async fn set_artists(
        &self,
        track_id: i64,
        artists: &[NewTrackArtist],
    ) -> Result<Vec<TrackArtist>, AppError>;
}
