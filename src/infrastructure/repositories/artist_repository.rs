//! Artist Repository Implementation
//!
//! PostgreSQL implementation of the ArtistRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Artist, ArtistRepository, ListQuery};
use crate::infrastructure::database::conflict_on_unique;
use crate::shared::error::AppError;

const ARTIST_COLUMNS: &str =
    "id, name, slug, bio, country, website_url, created_at, updated_at";

/// Database row representation matching the artists table schema.
#[derive(Debug, sqlx::FromRow)]
struct ArtistRow {
    id: i64,
    name: String,
    slug: String,
    bio: Option<String>,
    country: Option<String>,
    website_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ArtistRow {
    fn into_artist(self) -> Artist {
        Artist {
            id: self.id,
            name: self.name,
            slug: self.slug,
            bio: self.bio,
            country: self.country,
            website_url: self.website_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// PostgreSQL artist repository implementation.
#[derive(Clone)]
pub struct PgArtistRepository {
    pool: PgPool,
}

impl PgArtistRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArtistRepository for PgArtistRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Artist>, AppError> {
        let row = sqlx::query_as::<_, ArtistRow>(&format!(
            "SELECT {ARTIST_COLUMNS} FROM artists WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ArtistRow::into_artist))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Artist>, AppError> {
        let row = sqlx::query_as::<_, ArtistRow>(&format!(
            "SELECT {ARTIST_COLUMNS} FROM artists WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ArtistRow::into_artist))
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Artist>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, ArtistRow>(&format!(
            "SELECT {ARTIST_COLUMNS} FROM artists WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ArtistRow::into_artist).collect())
    }

    async fn find_by_slugs(&self, slugs: &[String]) -> Result<Vec<Artist>, AppError> {
        if slugs.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, ArtistRow>(&format!(
            "SELECT {ARTIST_COLUMNS} FROM artists WHERE slug = ANY($1)"
        ))
        .bind(slugs)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ArtistRow::into_artist).collect())
    }

    async fn list(&self, query: &ListQuery) -> Result<(Vec<Artist>, i64), AppError> {
        let pattern = query.like_pattern();

        let rows = sqlx::query_as::<_, ArtistRow>(&format!(
            r#"
            SELECT {ARTIST_COLUMNS}
            FROM artists
            WHERE ($1::text IS NULL OR name ILIKE $1)
            ORDER BY lower(name), id
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(&pattern)
        .bind(query.limit)
        .bind(query.offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM artists WHERE ($1::text IS NULL OR name ILIKE $1)",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok((rows.into_iter().map(ArtistRow::into_artist).collect(), total))
    }

    async fn create(&self, artist: &Artist) -> Result<Artist, AppError> {
        let row = sqlx::query_as::<_, ArtistRow>(&format!(
            r#"
            INSERT INTO artists (id, name, slug, bio, country, website_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING {ARTIST_COLUMNS}
            "#
        ))
        .bind(artist.id)
        .bind(&artist.name)
        .bind(&artist.slug)
        .bind(&artist.bio)
        .bind(&artist.country)
        .bind(&artist.website_url)
        .bind(artist.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(conflict_on_unique("An artist with this slug already exists"))?;

        Ok(row.into_artist())
    }

    async fn update(&self, artist: &Artist) -> Result<Artist, AppError> {
        let row = sqlx::query_as::<_, ArtistRow>(&format!(
            r#"
            UPDATE artists
            SET name = $2,
                slug = $3,
                bio = $4,
                country = $5,
                website_url = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {ARTIST_COLUMNS}
            "#
        ))
        .bind(artist.id)
        .bind(&artist.name)
        .bind(&artist.slug)
        .bind(&artist.bio)
        .bind(&artist.country)
        .bind(&artist.website_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(conflict_on_unique("An artist with this slug already exists"))?
        .ok_or_else(|| AppError::NotFound(format!("Artist with id {} not found", artist.id)))?;

        Ok(row.into_artist())
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM artists WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
