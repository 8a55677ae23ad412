//! Image Repository Implementation
//!
//! PostgreSQL implementation of the ImageRepository trait. Positions are
//! kept dense (1..n) per owner: inserts append, deletes compact and
//! reorders rewrite the whole list.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Image, ImageOwner, ImageRepository};
use crate::infrastructure::database::conflict_on_unique;
use crate::shared::error::AppError;

const IMAGE_COLUMNS: &str = "id, owner_kind, owner_id, storage_key, url, alt_text, width, height, \
     content_type, size_bytes, position, created_at";

#[derive(Debug, sqlx::FromRow)]
struct ImageRow {
    id: i64,
    owner_kind: String,
    owner_id: i64,
    storage_key: String,
    url: String,
    alt_text: Option<String>,
    width: Option<i32>,
    height: Option<i32>,
    content_type: String,
    size_bytes: i64,
    position: i32,
    created_at: DateTime<Utc>,
}

impl ImageRow {
    fn into_image(self) -> Result<Image, AppError> {
        let owner_kind = ImageOwner::from_str(&self.owner_kind).ok_or_else(|| {
            AppError::Internal(format!("Unknown image owner kind '{}'", self.owner_kind))
        })?;

        Ok(Image {
            id: self.id,
            owner_kind,
            owner_id: self.owner_id,
            storage_key: self.storage_key,
            url: self.url,
            alt_text: self.alt_text,
            width: self.width,
            height: self.height,
            content_type: self.content_type,
            size_bytes: self.size_bytes,
            position: self.position,
            created_at: self.created_at,
        })
    }
}

/// Table holding the records of each owner kind.
fn owner_table(owner: ImageOwner) -> &'static str {
    match owner {
        ImageOwner::Artist => "artists",
        ImageOwner::Group => "groups",
        ImageOwner::Release => "releases",
        ImageOwner::Profile => "users",
    }
}

/// PostgreSQL image repository implementation.
#[derive(Clone)]
pub struct PgImageRepository {
    pool: PgPool,
}

impl PgImageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ImageRepository for PgImageRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Image>, AppError> {
        let row = sqlx::query_as::<_, ImageRow>(&format!(
            "SELECT {IMAGE_COLUMNS} FROM images WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ImageRow::into_image).transpose()
    }

    async fn list_for_owner(&self, owner: ImageOwner, owner_id: i64) -> Result<Vec<Image>, AppError> {
        let rows = sqlx::query_as::<_, ImageRow>(&format!(
            r#"
            SELECT {IMAGE_COLUMNS}
            FROM images
            WHERE owner_kind = $1 AND owner_id = $2
            ORDER BY position, id
            "#
        ))
        .bind(owner.as_str())
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ImageRow::into_image).collect()
    }

    async fn owner_exists(&self, owner: ImageOwner, owner_id: i64) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(&format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)",
            owner_table(owner)
        ))
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn create(&self, image: &Image) -> Result<Image, AppError> {
        let mut tx = self.pool.begin().await?;

        // Serialize appends for one owner so two uploads can't take the same slot.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1), hashtext($2::text))")
            .bind(image.owner_kind.as_str())
            .bind(image.owner_id.to_string())
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query_as::<_, ImageRow>(&format!(
            r#"
            INSERT INTO images (id, owner_kind, owner_id, storage_key, url, alt_text, width,
                                height, content_type, size_bytes, position, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                    (SELECT COALESCE(MAX(position), 0) + 1 FROM images
                     WHERE owner_kind = $2 AND owner_id = $3),
                    $11)
            RETURNING {IMAGE_COLUMNS}
            "#
        ))
        .bind(image.id)
        .bind(image.owner_kind.as_str())
        .bind(image.owner_id)
        .bind(&image.storage_key)
        .bind(&image.url)
        .bind(&image.alt_text)
        .bind(image.width)
        .bind(image.height)
        .bind(&image.content_type)
        .bind(image.size_bytes)
        .bind(image.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(conflict_on_unique("This image has already been registered"))?;

        tx.commit().await?;

        row.into_image()
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query_as::<_, (String, i64, i32)>(
            "DELETE FROM images WHERE id = $1 RETURNING owner_kind, owner_id, position",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((owner_kind, owner_id, position)) = deleted else {
            return Ok(false);
        };

        sqlx::query(
            r#"
            UPDATE images SET position = position - 1
            WHERE owner_kind = $1 AND owner_id = $2 AND position > $3
            "#,
        )
        .bind(&owner_kind)
        .bind(owner_id)
        .bind(position)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(true)
    }

    async fn reorder(
        &self,
        owner: ImageOwner,
        owner_id: i64,
        ordered_ids: &[i64],
    ) -> Result<Vec<Image>, AppError> {
        let mut tx = self.pool.begin().await?;

        for (index, image_id) in ordered_ids.iter().enumerate() {
            let result = sqlx::query(
                r#"
                UPDATE images SET position = $4
                WHERE id = $1 AND owner_kind = $2 AND owner_id = $3
                "#,
            )
            .bind(image_id)
            .bind(owner.as_str())
            .bind(owner_id)
            .bind(index as i32 + 1)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                // Dropping the transaction rolls back earlier updates.
                return Err(AppError::BadRequest(format!(
                    "Image {} does not belong to this {}",
                    image_id, owner
                )));
            }
        }

        tx.commit().await?;

        self.list_for_owner(owner, owner_id).await
    }
}
