//! Track Repository Implementation
//!
//! PostgreSQL implementation of the TrackRepository trait, including artist
//! credits stored in `track_artists`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{
    AudioStatus, ListQuery, NewTrackArtist, Track, TrackArtist, TrackAudio, TrackCredit,
    TrackRepository,
};
use crate::infrastructure::database::{bad_reference, conflict_on_unique};
use crate::shared::error::AppError;

const TRACK_COLUMNS: &str = "id, title, slug, duration_ms, isrc, explicit, audio_status, \
     audio_key, audio_url, content_hash, mime_type, file_size, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct TrackRow {
    id: i64,
    title: String,
    slug: String,
    duration_ms: Option<i32>,
    isrc: Option<String>,
    explicit: bool,
    audio_status: String,
    audio_key: Option<String>,
    audio_url: Option<String>,
    content_hash: Option<String>,
    mime_type: Option<String>,
    file_size: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TrackRow {
    fn into_track(self) -> Track {
        Track {
            id: self.id,
            title: self.title,
            slug: self.slug,
            duration_ms: self.duration_ms,
            isrc: self.isrc,
            explicit: self.explicit,
            audio_status: AudioStatus::from_str(&self.audio_status),
            audio_key: self.audio_key,
            audio_url: self.audio_url,
            content_hash: self.content_hash,
            mime_type: self.mime_type,
            file_size: self.file_size,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TrackArtistRow {
    artist_id: i64,
    name: String,
    slug: String,
    credit: String,
    position: i32,
}

impl TrackArtistRow {
    fn into_credit(self) -> TrackArtist {
        TrackArtist {
            artist_id: self.artist_id,
            name: self.name,
            slug: self.slug,
            credit: TrackCredit::from_str(&self.credit).unwrap_or_default(),
            position: self.position,
        }
    }
}

/// PostgreSQL track repository implementation.
#[derive(Clone)]
pub struct PgTrackRepository {
    pool: PgPool,
}

impl PgTrackRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TrackRepository for PgTrackRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Track>, AppError> {
        let row = sqlx::query_as::<_, TrackRow>(&format!(
            "SELECT {TRACK_COLUMNS} FROM tracks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(TrackRow::into_track))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Track>, AppError> {
        let row = sqlx::query_as::<_, TrackRow>(&format!(
            "SELECT {TRACK_COLUMNS} FROM tracks WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(TrackRow::into_track))
    }

    async fn find_by_content_hash(&self, hash: &str) -> Result<Option<Track>, AppError> {
        let row = sqlx::query_as::<_, TrackRow>(&format!(
            "SELECT {TRACK_COLUMNS} FROM tracks WHERE content_hash = $1"
        ))
        .bind(hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(TrackRow::into_track))
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Track>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, TrackRow>(&format!(
            "SELECT {TRACK_COLUMNS} FROM tracks WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TrackRow::into_track).collect())
    }

    async fn list(&self, query: &ListQuery) -> Result<(Vec<Track>, i64), AppError> {
        let pattern = query.like_pattern();

        let rows = sqlx::query_as::<_, TrackRow>(&format!(
            r#"
            SELECT {TRACK_COLUMNS}
            FROM tracks
            WHERE ($1::text IS NULL OR title ILIKE $1)
            ORDER BY lower(title), id
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(&pattern)
        .bind(query.limit)
        .bind(query.offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM tracks WHERE ($1::text IS NULL OR title ILIKE $1)",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok((rows.into_iter().map(TrackRow::into_track).collect(), total))
    }

    async fn create(&self, track: &Track) -> Result<Track, AppError> {
        let row = sqlx::query_as::<_, TrackRow>(&format!(
            r#"
            INSERT INTO tracks (id, title, slug, duration_ms, isrc, explicit, audio_status,
                                content_hash, mime_type, file_size, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
            RETURNING {TRACK_COLUMNS}
            "#
        ))
        .bind(track.id)
        .bind(&track.title)
        .bind(&track.slug)
        .bind(track.duration_ms)
        .bind(&track.isrc)
        .bind(track.explicit)
        .bind(track.audio_status.as_str())
        .bind(&track.content_hash)
        .bind(&track.mime_type)
        .bind(track.file_size)
        .bind(track.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(conflict_on_unique(
            "A track with this slug or audio file already exists",
        ))?;

        Ok(row.into_track())
    }

    async fn update(&self, track: &Track) -> Result<Track, AppError> {
        let row = sqlx::query_as::<_, TrackRow>(&format!(
            r#"
            UPDATE tracks
            SET title = $2, slug = $3, duration_ms = $4, isrc = $5, explicit = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {TRACK_COLUMNS}
            "#
        ))
        .bind(track.id)
        .bind(&track.title)
        .bind(&track.slug)
        .bind(track.duration_ms)
        .bind(&track.isrc)
        .bind(track.explicit)
        .fetch_optional(&self.pool)
        .await
        .map_err(conflict_on_unique("A track with this slug already exists"))?
        .ok_or_else(|| AppError::NotFound(format!("Track with id {} not found", track.id)))?;

        Ok(row.into_track())
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tracks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn attach_audio(&self, id: i64, audio: &TrackAudio) -> Result<Track, AppError> {
        let row = sqlx::query_as::<_, TrackRow>(&format!(
            r#"
            UPDATE tracks
            SET audio_status = 'ready',
                audio_key = $2,
                audio_url = $3,
                mime_type = $4,
                file_size = $5,
                content_hash = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {TRACK_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&audio.key)
        .bind(&audio.url)
        .bind(&audio.mime_type)
        .bind(audio.file_size)
        .bind(&audio.content_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(conflict_on_unique(
            "This audio file is already registered to another track",
        ))?
        .ok_or_else(|| AppError::NotFound(format!("Track with id {} not found", id)))?;

        Ok(row.into_track())
    }

    async fn artists(&self, track_id: i64) -> Result<Vec<TrackArtist>, AppError> {
        let rows = sqlx::query_as::<_, TrackArtistRow>(
            r#"
            SELECT ta.artist_id, a.name, a.slug, ta.credit, ta.position
            FROM track_artists ta
            JOIN artists a ON a.id = ta.artist_id
            WHERE ta.track_id = $1
            ORDER BY ta.position
            "#,
        )
        .bind(track_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TrackArtistRow::into_credit).collect())
    }

    async fn set_artists(
        &self,
        track_id: i64,
        artists: &[NewTrackArtist],
    ) -> Result<Vec<TrackArtist>, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM track_artists WHERE track_id = $1")
            .bind(track_id)
            .execute(&mut *tx)
            .await?;

        for (index, artist) in artists.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO track_artists (track_id, artist_id, credit, position)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(track_id)
            .bind(artist.artist_id)
            .bind(artist.credit.as_str())
            .bind(index as i32 + 1)
            .execute(&mut *tx)
            .await
            .map_err(bad_reference("Unknown artist in credit list"))?;
        }

        tx.commit().await?;

        self.artists(track_id).await
    }
}
