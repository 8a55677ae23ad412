//! Group Repository Implementation
//!
//! PostgreSQL implementation of the GroupRepository trait, including
//! membership stored in `group_members`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Group, GroupMember, GroupRepository, ListQuery, NewGroupMember};
use crate::infrastructure::database::{bad_reference, conflict_on_unique};
use crate::shared::error::AppError;

const GROUP_COLUMNS: &str = "id, name, slug, description, formed_year, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct GroupRow {
    id: i64,
    name: String,
    slug: String,
    description: Option<String>,
    formed_year: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl GroupRow {
    fn into_group(self) -> Group {
        Group {
            id: self.id,
            name: self.name,
            slug: self.slug,
            description: self.description,
            formed_year: self.formed_year,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct GroupMemberRow {
    artist_id: i64,
    name: String,
    slug: String,
    role: Option<String>,
    position: i32,
}

impl GroupMemberRow {
    fn into_member(self) -> GroupMember {
        GroupMember {
            artist_id: self.artist_id,
            name: self.name,
            slug: self.slug,
            role: self.role,
            position: self.position,
        }
    }
}

/// PostgreSQL group repository implementation.
#[derive(Clone)]
pub struct PgGroupRepository {
    pool: PgPool,
}

impl PgGroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupRepository for PgGroupRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Group>, AppError> {
        let row = sqlx::query_as::<_, GroupRow>(&format!(
            "SELECT {GROUP_COLUMNS} FROM groups WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(GroupRow::into_group))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, AppError> {
        let row = sqlx::query_as::<_, GroupRow>(&format!(
            "SELECT {GROUP_COLUMNS} FROM groups WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(GroupRow::into_group))
    }

    async fn list(&self, query: &ListQuery) -> Result<(Vec<Group>, i64), AppError> {
        let pattern = query.like_pattern();

        let rows = sqlx::query_as::<_, GroupRow>(&format!(
            r#"
            SELECT {GROUP_COLUMNS}
            FROM groups
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
            "SELECT COUNT(*) FROM groups WHERE ($1::text IS NULL OR name ILIKE $1)",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok((rows.into_iter().map(GroupRow::into_group).collect(), total))
    }

    async fn create(&self, group: &Group) -> Result<Group, AppError> {
        let row = sqlx::query_as::<_, GroupRow>(&format!(
            r#"
            INSERT INTO groups (id, name, slug, description, formed_year, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING {GROUP_COLUMNS}
            "#
        ))
        .bind(group.id)
        .bind(&group.name)
        .bind(&group.slug)
        .bind(&group.description)
        .bind(group.formed_year)
        .bind(group.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(conflict_on_unique("A group with this slug already exists"))?;

        Ok(row.into_group())
    }

    async fn update(&self, group: &Group) -> Result<Group, AppError> {
        let row = sqlx::query_as::<_, GroupRow>(&format!(
            r#"
            UPDATE groups
            SET name = $2, slug = $3, description = $4, formed_year = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING {GROUP_COLUMNS}
            "#
        ))
        .bind(group.id)
        .bind(&group.name)
        .bind(&group.slug)
        .bind(&group.description)
        .bind(group.formed_year)
        .fetch_optional(&self.pool)
        .await
        .map_err(conflict_on_unique("A group with this slug already exists"))?
        .ok_or_else(|| AppError::NotFound(format!("Group with id {} not found", group.id)))?;

        Ok(row.into_group())
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn members(&self, group_id: i64) -> Result<Vec<GroupMember>, AppError> {
        let rows = sqlx::query_as::<_, GroupMemberRow>(
            r#"
            SELECT gm.artist_id, a.name, a.slug, gm.role, gm.position
            FROM group_members gm
            JOIN artists a ON a.id = gm.artist_id
            WHERE gm.group_id = $1
            ORDER BY gm.position
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(GroupMemberRow::into_member).collect())
    }

    async fn set_members(
        &self,
        group_id: i64,
        members: &[NewGroupMember],
    ) -> Result<Vec<GroupMember>, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM group_members WHERE group_id = $1")
            .bind(group_id)
            .execute(&mut *tx)
            .await?;

        for (index, member) in members.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO group_members (group_id, artist_id, role, position)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(group_id)
            .bind(member.artist_id)
            .bind(&member.role)
            .bind(index as i32 + 1)
            .execute(&mut *tx)
            .await
            .map_err(bad_reference("Unknown artist in member list"))?;
        }

        tx.commit().await?;

        self.members(group_id).await
    }

    async fn find_by_artist(&self, artist_id: i64) -> Result<Vec<Group>, AppError> {
        let rows = sqlx::query_as::<_, GroupRow>(
            r#"
            SELECT g.id, g.name, g.slug, g.description, g.formed_year, g.created_at, g.updated_at
            FROM groups g
            JOIN group_members gm ON gm.group_id = g.id
            WHERE gm.artist_id = $1
            ORDER BY lower(g.name), g.id
            "#,
        )
        .bind(artist_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(GroupRow::into_group).collect())
    }
}
