//! Banner Repository Implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{BannerRepository, BannerVariant, ListQuery, NotificationBanner};
use crate::shared::error::AppError;

const BANNER_COLUMNS: &str = "id, message, variant, link_url, link_label, is_active, \
     starts_at, ends_at, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct BannerRow {
    id: i64,
    message: String,
    variant: String,
    link_url: Option<String>,
    link_label: Option<String>,
    is_active: bool,
    starts_at: Option<DateTime<Utc>>,
    ends_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BannerRow {
    fn into_banner(self) -> NotificationBanner {
        NotificationBanner {
            id: self.id,
            message: self.message,
            variant: BannerVariant::from_str(&self.variant).unwrap_or_default(),
            link_url: self.link_url,
            link_label: self.link_label,
            is_active: self.is_active,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// PostgreSQL banner repository implementation.
#[derive(Clone)]
pub struct PgBannerRepository {
    pool: PgPool,
}

impl PgBannerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BannerRepository for PgBannerRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<NotificationBanner>, AppError> {
        let row = sqlx::query_as::<_, BannerRow>(&format!(
            "SELECT {BANNER_COLUMNS} FROM notification_banners WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(BannerRow::into_banner))
    }

    async fn list(&self, query: &ListQuery) -> Result<(Vec<NotificationBanner>, i64), AppError> {
        let pattern = query.like_pattern();

        let rows = sqlx::query_as::<_, BannerRow>(&format!(
            r#"
            SELECT {BANNER_COLUMNS}
            FROM notification_banners
            WHERE ($1::text IS NULL OR message ILIKE $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(&pattern)
        .bind(query.limit)
        .bind(query.offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notification_banners WHERE ($1::text IS NULL OR message ILIKE $1)",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok((rows.into_iter().map(BannerRow::into_banner).collect(), total))
    }

    async fn find_active(&self, now: DateTime<Utc>) -> Result<Vec<NotificationBanner>, AppError> {
        let rows = sqlx::query_as::<_, BannerRow>(&format!(
            r#"
            SELECT {BANNER_COLUMNS}
            FROM notification_banners
            WHERE is_active
              AND (starts_at IS NULL OR starts_at <= $1)
              AND (ends_at IS NULL OR ends_at > $1)
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(BannerRow::into_banner).collect())
    }

    async fn create(&self, banner: &NotificationBanner) -> Result<NotificationBanner, AppError> {
        let row = sqlx::query_as::<_, BannerRow>(&format!(
            r#"
            INSERT INTO notification_banners (id, message, variant, link_url, link_label,
                                              is_active, starts_at, ends_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING {BANNER_COLUMNS}
            "#
        ))
        .bind(banner.id)
        .bind(&banner.message)
        .bind(banner.variant.as_str())
        .bind(&banner.link_url)
        .bind(&banner.link_label)
        .bind(banner.is_active)
        .bind(banner.starts_at)
        .bind(banner.ends_at)
        .bind(banner.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_banner())
    }

    async fn update(&self, banner: &NotificationBanner) -> Result<NotificationBanner, AppError> {
        let row = sqlx::query_as::<_, BannerRow>(&format!(
            r#"
            UPDATE notification_banners
            SET message = $2, variant = $3, link_url = $4, link_label = $5, is_active = $6,
                starts_at = $7, ends_at = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING {BANNER_COLUMNS}
            "#
        ))
        .bind(banner.id)
        .bind(&banner.message)
        .bind(banner.variant.as_str())
        .bind(&banner.link_url)
        .bind(&banner.link_label)
        .bind(banner.is_active)
        .bind(banner.starts_at)
        .bind(banner.ends_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Banner with id {} not found", banner.id)))?;

        Ok(row.into_banner())
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM notification_banners WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
