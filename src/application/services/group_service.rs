//! Group Service
//!
//! Groups and their ordered member lists.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::application::dto::request::{
    CreateGroupRequest, GroupMemberInput, UpdateGroupRequest,
};
use crate::application::services::catalog::{
    ensure_all_found, ensure_distinct, resolve_slug, CatalogError,
};
use crate::domain::{
    ArtistRepository, Group, GroupMember, GroupRepository, Image, ImageOwner, ImageRepository,
    ListQuery, NewGroupMember, Page,
};
use crate::shared::snowflake::SnowflakeGenerator;
use crate::shared::validation::{normalize_optional, trimmed};

#[derive(Debug, Clone)]
pub struct GroupDetail {
    pub group: Group,
    pub members: Vec<GroupMember>,
    pub images: Vec<Image>,
}

/// Group service trait
#[async_trait]
pub trait GroupService: Send + Sync {
    async fn list_groups(&self, query: ListQuery) -> Result<Page<Group>, CatalogError>;

    async fn get_group(&self, id: i64) -> Result<GroupDetail, CatalogError>;

    async fn get_group_by_slug(&self, slug: &str) -> Result<GroupDetail, CatalogError>;

    async fn create_group(&self, request: CreateGroupRequest) -> Result<Group, CatalogError>;

    async fn update_group(&self, id: i64, update: UpdateGroupRequest)
        -> Result<Group, CatalogError>;

    async fn delete_group(&self, id: i64) -> Result<(), CatalogError>;

    /// Replace the member list. Order becomes position.
    async fn set_members(
        &self,
        id: i64,
        members: Vec<GroupMemberInput>,
    ) -> Result<Vec<GroupMember>, CatalogError>;
}

/// GroupService implementation
pub struct GroupServiceImpl<G, A, I>
where
    G: GroupRepository,
    A: ArtistRepository,
    I: ImageRepository,
{
    group_repo: Arc<G>,
    artist_repo: Arc<A>,
    image_repo: Arc<I>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<G, A, I> GroupServiceImpl<G, A, I>
where
    G: GroupRepository,
    A: ArtistRepository,
    I: ImageRepository,
{
    pub fn new(
        group_repo: Arc<G>,
        artist_repo: Arc<A>,
        image_repo: Arc<I>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            group_repo,
            artist_repo,
            image_repo,
            id_generator,
        }
    }

    async fn detail(&self, group: Group) -> Result<GroupDetail, CatalogError> {
        let members = self.group_repo.members(group.id).await?;
        let images = self
            .image_repo
            .list_for_owner(ImageOwner::Group, group.id)
            .await?;
        Ok(GroupDetail {
            group,
            members,
            images,
        })
    }

    async fn require(&self, id: i64) -> Result<Group, CatalogError> {
        self.group_repo
            .find_by_id(id)
            .await?
            .ok_or(CatalogError::NotFound("Group"))
    }

    async fn ensure_slug_free(&self, slug: &str, own_id: Option<i64>) -> Result<(), CatalogError> {
        match self.group_repo.find_by_slug(slug).await? {
            Some(existing) if Some(existing.id) != own_id => Err(CatalogError::SlugTaken("group")),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl<G, A, I> GroupService for GroupServiceImpl<G, A, I>
where
    G: GroupRepository + 'static,
    A: ArtistRepository + 'static,
    I: ImageRepository + 'static,
{
    async fn list_groups(&self, query: ListQuery) -> Result<Page<Group>, CatalogError> {
        let (groups, total) = self.group_repo.list(&query).await?;
        Ok(Page::new(groups, total, &query))
    }

    async fn get_group(&self, id: i64) -> Result<GroupDetail, CatalogError> {
        let group = self.require(id).await?;
        self.detail(group).await
    }

    async fn get_group_by_slug(&self, slug: &str) -> Result<GroupDetail, CatalogError> {
        let group = self
            .group_repo
            .find_by_slug(slug)
            .await?
            .ok_or(CatalogError::NotFound("Group"))?;
        self.detail(group).await
    }

    async fn create_group(&self, request: CreateGroupRequest) -> Result<Group, CatalogError> {
        let name = request.name.trim().to_string();
        let slug = resolve_slug(request.slug.as_deref(), &name)?;
        self.ensure_slug_free(slug.as_str(), None).await?;

        let mut group = Group::new(self.id_generator.generate(), name, slug.into_inner());
        group.description = trimmed(request.description);
        group.formed_year = request.formed_year;

        let group = self.group_repo.create(&group).await?;
        tracing::info!(group_id = group.id, slug = %group.slug, "Group created");
        Ok(group)
    }

    async fn update_group(
        &self,
        id: i64,
        update: UpdateGroupRequest,
    ) -> Result<Group, CatalogError> {
        let mut group = self.require(id).await?;

        if let Some(name) = update.name {
            group.name = name.trim().to_string();
        }
        if let Some(slug) = update.slug {
            let slug = resolve_slug(Some(&slug), &group.name)?;
            if slug.as_str() != group.slug {
                self.ensure_slug_free(slug.as_str(), Some(id)).await?;
                group.slug = slug.into_inner();
            }
        }
        if let Some(description) = normalize_optional(update.description) {
            group.description = description;
        }
        if let Some(formed_year) = update.formed_year {
            group.formed_year = formed_year;
        }
        group.updated_at = Utc::now();

        let group = self.group_repo.update(&group).await?;
        tracing::info!(group_id = id, "Group updated");
        Ok(group)
    }

    async fn delete_group(&self, id: i64) -> Result<(), CatalogError> {
        if !self.group_repo.delete(id).await? {
            return Err(CatalogError::NotFound("Group"));
        }
        tracing::info!(group_id = id, "Group deleted");
        Ok(())
    }

    async fn set_members(
        &self,
        id: i64,
        members: Vec<GroupMemberInput>,
    ) -> Result<Vec<GroupMember>, CatalogError> {
        self.require(id).await?;

        let artist_ids: Vec<i64> = members.iter().map(|m| m.artist_id).collect();
        ensure_distinct(&artist_ids, "artist")?;
        if !artist_ids.is_empty() {
            let found = self.artist_repo.find_by_ids(&artist_ids).await?;
            ensure_all_found(&artist_ids, found.iter().map(|a| a.id), "artist")?;
        }

        let members: Vec<NewGroupMember> = members
            .into_iter()
            .map(|m| NewGroupMember {
                artist_id: m.artist_id,
                role: trimmed(m.role),
            })
            .collect();
        let members = self.group_repo.set_members(id, &members).await?;

        tracing::info!(group_id = id, members = members.len(), "Group members replaced");
        Ok(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Artist, MockArtistRepository, MockGroupRepository, MockImageRepository};
    use crate::shared::error::AppError;
    use axum::http::StatusCode;

    fn service(
        groups: MockGroupRepository,
        artists: MockArtistRepository,
    ) -> GroupServiceImpl<MockGroupRepository, MockArtistRepository, MockImageRepository> {
        GroupServiceImpl::new(
            Arc::new(groups),
            Arc::new(artists),
            Arc::new(MockImageRepository::new()),
            Arc::new(SnowflakeGenerator::new(1, crate::shared::snowflake::DEFAULT_EPOCH)),
        )
    }

    fn existing_groups() -> MockGroupRepository {
        let mut groups = MockGroupRepository::new();
        groups
            .expect_find_by_id()
            .returning(|id| Ok(Some(Group::new(id, "Blur".into(), "blur".into()))));
        groups
    }

    fn member(artist_id: i64, role: Option<&str>) -> GroupMemberInput {
        GroupMemberInput {
            artist_id,
            role: role.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_set_members_preserves_order() {
        let mut groups = existing_groups();
        groups
            .expect_set_members()
            .withf(|_, members| {
                members.iter().map(|m| m.artist_id).collect::<Vec<_>>() == vec![3, 1, 2]
            })
            .returning(|_, members| {
                Ok(members
                    .iter()
                    .enumerate()
                    .map(|(i, m)| GroupMember {
                        artist_id: m.artist_id,
                        name: format!("Artist {}", m.artist_id),
                        slug: format!("artist-{}", m.artist_id),
                        role: m.role.clone(),
                        position: i as i32 + 1,
                    })
                    .collect())
            });
        let mut artists = MockArtistRepository::new();
        artists.expect_find_by_ids().returning(|ids| {
            Ok(ids
                .iter()
                .map(|id| Artist::new(*id, format!("Artist {}", id), format!("artist-{}", id)))
                .collect())
        });

        let members = service(groups, artists)
            .set_members(
                7,
                vec![member(3, Some("vocals")), member(1, Some(" ")), member(2, None)],
            )
            .await
            .unwrap();

        assert_eq!(members[0].artist_id, 3);
        assert_eq!(members[0].position, 1);
        assert_eq!(members[1].role, None);
    }

    #[tokio::test]
    async fn test_set_members_rejects_duplicates() {
        let mut groups = existing_groups();
        groups.expect_set_members().never();

        let err = service(groups, MockArtistRepository::new())
            .set_members(7, vec![member(1, None), member(1, None)])
            .await
            .unwrap_err();
        assert_eq!(AppError::from(err).status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_set_members_rejects_unknown_artist() {
        let mut groups = existing_groups();
        groups.expect_set_members().never();
        let mut artists = MockArtistRepository::new();
        artists
            .expect_find_by_ids()
            .returning(|_| Ok(vec![Artist::new(1, "One".into(), "one".into())]));

        let err = service(groups, artists)
            .set_members(7, vec![member(1, None), member(2, None)])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Unknown artist: 2");
    }

    #[tokio::test]
    async fn test_update_formed_year_null_clears() {
        let mut groups = MockGroupRepository::new();
        groups.expect_find_by_id().returning(|id| {
            let mut group = Group::new(id, "Blur".into(), "blur".into());
            group.formed_year = Some(1988);
            Ok(Some(group))
        });
        groups.expect_update().returning(|g| Ok(g.clone()));

        let group = service(groups, MockArtistRepository::new())
            .update_group(
                7,
                UpdateGroupRequest {
                    formed_year: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(group.formed_year, None);
    }

    #[tokio::test]
    async fn test_set_members_on_missing_group() {
        let mut groups = MockGroupRepository::new();
        groups.expect_find_by_id().returning(|_| Ok(None));

        let err = service(groups, MockArtistRepository::new())
            .set_members(7, vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound("Group")));
    }
}
