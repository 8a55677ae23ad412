//! Group entity and repository trait.
//!
//! A group is a band or collective made of artists. Maps to the `groups`
//! table, with membership stored in `group_members`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::ListQuery;
use crate::shared::error::AppError;

/// Represents a group of artists.
///
/// Maps to the `groups` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - name: VARCHAR(200) NOT NULL
/// - slug: VARCHAR(120) NOT NULL UNIQUE
/// - description: TEXT NULL
/// - formed_year: INTEGER NULL
/// - created_at / updated_at: TIMESTAMPTZ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Snowflake ID (primary key)
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    /// Year the group was formed (1900-2100)
    pub formed_year: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Group {
    pub fn new(id: i64, name: String, slug: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            slug,
            description: None,
            formed_year: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A member row joined with the artist it points at.
///
/// Maps to `group_members` (PK group_id, artist_id; cascades on delete).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    pub artist_id: i64,
    pub name: String,
    pub slug: String,
    /// Free-form role, e.g. "vocals"
    pub role: Option<String>,
    /// 1-based display order
    pub position: i32,
}

/// Membership entry used when replacing a group's members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGroupMember {
    pub artist_id: i64,
    pub role: Option<String>,
}

/// Repository trait for Group data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Group>, AppError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, AppError>;

    async fn list(&self, query: &ListQuery) -> Result<(Vec<Group>, i64), AppError>;

    async fn create(&self, group: &Group) -> Result<Group, AppError>;

    async fn update(&self, group: &Group) -> Result<Group, AppError>;

    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Members in position order.
    async fn members(&self, group_id: i64) -> Result<Vec<GroupMember>, AppError>;

    /// Replace all members atomically. Positions follow slice order.
    async fn set_members(
        &self,
        group_id: i64,
        members: &[NewGroupMember],
    ) -> Result<Vec<GroupMember>, AppError>;

    /// Groups the artist is a member of.
    async fn find_by_artist(&self, artist_id: i64) -> Result<Vec<Group>, AppError>;
}
