//! Notification Banner Service

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::application::dto::request::{CreateBannerRequest, UpdateBannerRequest};
use crate::application::services::catalog::CatalogError;
use crate::domain::{BannerRepository, ListQuery, NotificationBanner, Page};
use crate::shared::snowflake::SnowflakeGenerator;
use crate::shared::validation::{normalize_optional, trimmed};

/// Banner service trait
#[async_trait]
pub trait BannerService: Send + Sync {
    async fn list_banners(&self, query: ListQuery)
        -> Result<Page<NotificationBanner>, CatalogError>;

    /// Banners visible right now, newest first
    async fn active_banners(&self) -> Result<Vec<NotificationBanner>, CatalogError>;

    async fn create_banner(
        &self,
        request: CreateBannerRequest,
    ) -> Result<NotificationBanner, CatalogError>;

    async fn update_banner(
        &self,
        id: i64,
        update: UpdateBannerRequest,
    ) -> Result<NotificationBanner, CatalogError>;

    async fn delete_banner(&self, id: i64) -> Result<(), CatalogError>;
}

fn check_window(banner: &NotificationBanner) -> Result<(), CatalogError> {
    if banner.has_valid_window() {
        Ok(())
    } else {
        Err(CatalogError::Invalid("ends_at must be after starts_at".into()))
    }
}

/// BannerService implementation
pub struct BannerServiceImpl<B: BannerRepository> {
    banner_repo: Arc<B>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<B: BannerRepository> BannerServiceImpl<B> {
    pub fn new(banner_repo: Arc<B>, id_generator: Arc<SnowflakeGenerator>) -> Self {
        Self {
            banner_repo,
            id_generator,
        }
    }
}

#[async_trait]
impl<B: BannerRepository + 'static> BannerService for BannerServiceImpl<B> {
    async fn list_banners(
        &self,
        query: ListQuery,
    ) -> Result<Page<NotificationBanner>, CatalogError> {
        let (banners, total) = self.banner_repo.list(&query).await?;
        Ok(Page::new(banners, total, &query))
    }

    async fn active_banners(&self) -> Result<Vec<NotificationBanner>, CatalogError> {
        let now = Utc::now();
        let mut banners = self.banner_repo.find_active(now).await?;
        banners.retain(|b| b.is_visible_at(now));
        banners.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(banners)
    }

    async fn create_banner(
        &self,
        request: CreateBannerRequest,
    ) -> Result<NotificationBanner, CatalogError> {
        let mut banner = NotificationBanner::new(
            self.id_generator.generate(),
            request.message.trim().to_string(),
            request.variant,
        );
        banner.link_url = trimmed(request.link_url);
        banner.link_label = trimmed(request.link_label);
        banner.is_active = request.is_active.unwrap_or(true);
        banner.starts_at = request.starts_at;
        banner.ends_at = request.ends_at;
        check_window(&banner)?;

        let banner = self.banner_repo.create(&banner).await?;
        tracing::info!(banner_id = banner.id, variant = banner.variant.as_str(), "Banner created");
        Ok(banner)
    }

    async fn update_banner(
        &self,
        id: i64,
        update: UpdateBannerRequest,
    ) -> Result<NotificationBanner, CatalogError> {
        let mut banner = self
            .banner_repo
            .find_by_id(id)
            .await?
            .ok_or(CatalogError::NotFound("Banner"))?;

        if let Some(message) = update.message {
            banner.message = message.trim().to_string();
        }
        if let Some(variant) = update.variant {
            banner.variant = variant;
        }
        if let Some(link_url) = normalize_optional(update.link_url) {
            banner.link_url = link_url;
        }
        if let Some(link_label) = normalize_optional(update.link_label) {
            banner.link_label = link_label;
        }
        if let Some(is_active) = update.is_active {
            banner.is_active = is_active;
        }
        if let Some(starts_at) = update.starts_at {
            banner.starts_at = starts_at;
        }
        if let Some(ends_at) = update.ends_at {
            banner.ends_at = ends_at;
        }
        check_window(&banner)?;
        banner.updated_at = Utc::now();

        let banner = self.banner_repo.update(&banner).await?;
        tracing::info!(banner_id = id, "Banner updated");
        Ok(banner)
    }

    async fn delete_banner(&self, id: i64) -> Result<(), CatalogError> {
        if !self.banner_repo.delete(id).await? {
            return Err(CatalogError::NotFound("Banner"));
        }
        tracing::info!(banner_id = id, "Banner deleted");
        Ok(())
    }
}
