//! Release Repository Implementation
//!
//! PostgreSQL implementation of the ReleaseRepository trait. Tracklists
//! and artist credits are replaced wholesale inside a transaction.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use crate::domain::{
    ArtistSummary, ListQuery, NewReleaseTrack, Release, ReleaseRepository, ReleaseTrack,
    ReleaseType,
};
use crate::infrastructure::database::{bad_reference, conflict_on_unique};
use crate::shared::error::AppError;

const RELEASE_COLUMNS: &str = "id, title, slug, release_type, release_date, label, description, \
     published, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct ReleaseRow {
    id: i64,
    title: String,
    slug: String,
    release_type: String,
    release_date: Option<NaiveDate>,
    label: Option<String>,
    description: Option<String>,
    published: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ReleaseRow {
    fn into_release(self) -> Release {
        Release {
            id: self.id,
            title: self.title,
            slug: self.slug,
            release_type: ReleaseType::from_str(&self.release_type).unwrap_or_default(),
            release_date: self.release_date,
            label: self.label,
            description: self.description,
            published: self.published,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ReleaseTrackRow {
    track_id: i64,
    title: String,
    slug: String,
    duration_ms: Option<i32>,
    disc_number: i32,
    position: i32,
}

#[derive(Debug, sqlx::FromRow)]
struct ReleaseArtistRow {
    artist_id: i64,
    name: String,
    slug: String,
}

/// PostgreSQL release repository implementation.
#[derive(Clone)]
pub struct PgReleaseRepository {
    pool: PgPool,
}

impl PgReleaseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReleaseRepository for PgReleaseRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Release>, AppError> {
        let row = sqlx::query_as::<_, ReleaseRow>(&format!(
            "SELECT {RELEASE_COLUMNS} FROM releases WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ReleaseRow::into_release))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Release>, AppError> {
        let row = sqlx::query_as::<_, ReleaseRow>(&format!(
            "SELECT {RELEASE_COLUMNS} FROM releases WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ReleaseRow::into_release))
    }

    async fn list(&self, query: &ListQuery) -> Result<(Vec<Release>, i64), AppError> {
        let pattern = query.like_pattern();

        let rows = sqlx::query_as::<_, ReleaseRow>(&format!(
            r#"
            SELECT {RELEASE_COLUMNS}
            FROM releases
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
            "SELECT COUNT(*) FROM releases WHERE ($1::text IS NULL OR title ILIKE $1)",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok((rows.into_iter().map(ReleaseRow::into_release).collect(), total))
    }

    async fn create(&self, release: &Release) -> Result<Release, AppError> {
        let row = sqlx::query_as::<_, ReleaseRow>(&format!(
            r#"
            INSERT INTO releases (id, title, slug, release_type, release_date, label,
                                  description, published, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING {RELEASE_COLUMNS}
            "#
        ))
        .bind(release.id)
        .bind(&release.title)
        .bind(&release.slug)
        .bind(release.release_type.as_str())
        .bind(release.release_date)
        .bind(&release.label)
        .bind(&release.description)
        .bind(release.published)
        .bind(release.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(conflict_on_unique("A release with this slug already exists"))?;

        Ok(row.into_release())
    }

    async fn update(&self, release: &Release) -> Result<Release, AppError> {
        let row = sqlx::query_as::<_, ReleaseRow>(&format!(
            r#"
            UPDATE releases
            SET title = $2, slug = $3, release_type = $4, release_date = $5, label = $6,
                description = $7, published = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING {RELEASE_COLUMNS}
            "#
        ))
        .bind(release.id)
        .bind(&release.title)
        .bind(&release.slug)
        .bind(release.release_type.as_str())
        .bind(release.release_date)
        .bind(&release.label)
        .bind(&release.description)
        .bind(release.published)
        .fetch_optional(&self.pool)
        .await
        .map_err(conflict_on_unique("A release with this slug already exists"))?
        .ok_or_else(|| AppError::NotFound(format!("Release with id {} not found", release.id)))?;

        Ok(row.into_release())
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM releases WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn tracks(&self, release_id: i64) -> Result<Vec<ReleaseTrack>, AppError> {
        let rows = sqlx::query_as::<_, ReleaseTrackRow>(
            r#"
            SELECT rt.track_id, t.title, t.slug, t.duration_ms, rt.disc_number, rt.position
            FROM release_tracks rt
            JOIN tracks t ON t.id = rt.track_id
            WHERE rt.release_id = $1
            ORDER BY rt.disc_number, rt.position
            "#,
        )
        .bind(release_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| ReleaseTrack {
                track_id: r.track_id,
                title: r.title,
                slug: r.slug,
                duration_ms: r.duration_ms,
                disc_number: r.disc_number,
                position: r.position,
            })
            .collect())
    }

    async fn set_tracks(
        &self,
        release_id: i64,
        tracks: &[NewReleaseTrack],
    ) -> Result<Vec<ReleaseTrack>, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM release_tracks WHERE release_id = $1")
            .bind(release_id)
            .execute(&mut *tx)
            .await?;

        for entry in tracks {
            sqlx::query(
                r#"
                INSERT INTO release_tracks (release_id, track_id, disc_number, position)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(release_id)
            .bind(entry.track_id)
            .bind(entry.disc_number)
            .bind(entry.position)
            .execute(&mut *tx)
            .await
            .map_err(bad_reference("Unknown track in tracklist"))?;
        }

        tx.commit().await?;

        self.tracks(release_id).await
    }

    async fn artists(&self, release_id: i64) -> Result<Vec<ArtistSummary>, AppError> {
        let rows = sqlx::query_as::<_, ReleaseArtistRow>(
            r#"
            SELECT ra.artist_id, a.name, a.slug
            FROM release_artists ra
            JOIN artists a ON a.id = ra.artist_id
            WHERE ra.release_id = $1
            ORDER BY ra.position
            "#,
        )
        .bind(release_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| ArtistSummary {
                artist_id: r.artist_id,
                name: r.name,
                slug: r.slug,
            })
            .collect())
    }

    async fn set_artists(
        &self,
        release_id: i64,
        artist_ids: &[i64],
    ) -> Result<Vec<ArtistSummary>, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM release_artists WHERE release_id = $1")
            .bind(release_id)
            .execute(&mut *tx)
            .await?;

        for (index, artist_id) in artist_ids.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO release_artists (release_id, artist_id, position)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(release_id)
            .bind(artist_id)
            .bind(index as i32 + 1)
            .execute(&mut *tx)
            .await
            .map_err(bad_reference("Unknown artist in credit list"))?;
        }

        tx.commit().await?;

        self.artists(release_id).await
    }
}
