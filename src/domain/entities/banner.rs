//! Notification banner entity and repository trait.
//!
//! Maps to the `notification_banners` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::ListQuery;
use crate::shared::error::AppError;

/// Visual style of a banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BannerVariant {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl BannerVariant {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "info" => Some(Self::Info),
            "success" => Some(Self::Success),
            "warning" => Some(Self::Warning),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// A site-wide message shown to users.
///
/// Maps to the `notification_banners` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - message: TEXT NOT NULL
/// - variant: VARCHAR(16) NOT NULL
/// - link_url / link_label: TEXT NULL
/// - is_active: BOOLEAN NOT NULL
/// - starts_at / ends_at: TIMESTAMPTZ NULL (CHECK ends_at > starts_at)
/// - created_at / updated_at: TIMESTAMPTZ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationBanner {
    pub id: i64,
    pub message: String,
    pub variant: BannerVariant,
    pub link_url: Option<String>,
    pub link_label: Option<String>,
    pub is_active: bool,
    /// Inclusive start of the display window (open when `None`)
    pub starts_at: Option<DateTime<Utc>>,
    /// Exclusive end of the display window (open when `None`)
    pub ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NotificationBanner {
    pub fn new(id: i64, message: String, variant: BannerVariant) -> Self {
        let now = Utc::now();
        Self {
            id,
            message,
            variant,
            link_url: None,
            link_label: None,
            is_active: true,
            starts_at: None,
            ends_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the banner should be displayed at `now`.
    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.starts_at.is_none_or(|start| start <= now)
            && self.ends_at.is_none_or(|end| now < end)
    }

    /// Whether the display window is well-formed.
    pub fn has_valid_window(&self) -> bool {
        match (self.starts_at, self.ends_at) {
            (Some(start), Some(end)) => end > start,
            _ => true,
        }
    }
}

/// Repository trait for banner data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BannerRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<NotificationBanner>, AppError>;

    async fn list(&self, query: &ListQuery) -> Result<(Vec<NotificationBanner>, i64), AppError>;

    /// Banners visible at `now`, newest first.
    async fn find_active(&self, now: DateTime<Utc>) -> Result<Vec<NotificationBanner>, AppError>;

    async fn create(&self, banner: &NotificationBanner) -> Result<NotificationBanner, AppError>;

    async fn update(&self, banner: &NotificationBanner) -> Result<NotificationBanner, AppError>;

    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_open_window_is_visible() {
        let banner = NotificationBanner::new(1, "Hello".into(), BannerVariant::Info);
        assert!(banner.is_visible_at(Utc::now()));
    }

    #[test]
    fn test_inactive_is_hidden() {
        let mut banner = NotificationBanner::new(1, "Hello".into(), BannerVariant::Info);
        banner.is_active = false;
        assert!(!banner.is_visible_at(Utc::now()));
    }

    #[test]
    fn test_window_bounds() {
        let now = Utc::now();
        let mut banner = NotificationBanner::new(1, "Maintenance".into(), BannerVariant::Warning);
        banner.starts_at = Some(now);
        banner.ends_at = Some(now + Duration::hours(1));

        assert!(banner.is_visible_at(now));
        assert!(!banner.is_visible_at(now - Duration::seconds(1)));
        assert!(!banner.is_visible_at(now + Duration::hours(1)));
    }

    #[test]
    fn test_window_validation() {
        let now = Utc::now();
        let mut banner = NotificationBanner::new(1, "x".into(), BannerVariant::Error);
        assert!(banner.has_valid_window());
        banner.starts_at = Some(now);
        banner.ends_at = Some(now);
        assert!(!banner.has_valid_window());
        banner.ends_at = None;
        assert!(banner.has_valid_window());
    }
}
