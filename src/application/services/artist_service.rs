//! Artist Service

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::application::dto::request::{CreateArtistRequest, UpdateArtistRequest};
use crate::application::services::catalog::{resolve_slug, CatalogError};
use crate::domain::{
    Artist, ArtistRepository, Group, GroupRepository, Image, ImageOwner, ImageRepository,
    ListQuery, Page,
};
use crate::shared::snowflake::SnowflakeGenerator;
use crate::shared::validation::{normalize_optional, trimmed};

/// An artist with the groups it belongs to and its images
#[derive(Debug, Clone)]
pub struct ArtistDetail {
    pub artist: Artist,
    pub groups: Vec<Group>,
    pub images: Vec<Image>,
}

/// Artist service trait
#[async_trait]
pub trait ArtistService: Send + Sync {
    async fn list_artists(&self, query: ListQuery) -> Result<Page<Artist>, CatalogError>;

    async fn get_artist(&self, id: i64) -> Result<ArtistDetail, CatalogError>;

    async fn get_artist_by_slug(&self, slug: &str) -> Result<ArtistDetail, CatalogError>;

    async fn create_artist(&self, request: CreateArtistRequest) -> Result<Artist, CatalogError>;

    async fn update_artist(
        &self,
        id: i64,
        update: UpdateArtistRequest,
    ) -> Result<Artist, CatalogError>;

    /// Hard delete; memberships, credits and images go with it.
    async fn delete_artist(&self, id: i64) -> Result<(), CatalogError>;
}

/// ArtistService implementation
pub struct ArtistServiceImpl<A, G, I>
where
    A: ArtistRepository,
    G: GroupRepository,
    I: ImageRepository,
{
    artist_repo: Arc<A>,
    group_repo: Arc<G>,
    image_repo: Arc<I>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<A, G, I> ArtistServiceImpl<A, G, I>
where
    A: ArtistRepository,
    G: GroupRepository,
    I: ImageRepository,
{
    pub fn new(
        artist_repo: Arc<A>,
        group_repo: Arc<G>,
        image_repo: Arc<I>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            artist_repo,
            group_repo,
            image_repo,
            id_generator,
        }
    }

    async fn detail(&self, artist: Artist) -> Result<ArtistDetail, CatalogError> {
        let groups = self.group_repo.find_by_artist(artist.id).await?;
        let images = self
            .image_repo
            .list_for_owner(ImageOwner::Artist, artist.id)
            .await?;
        Ok(ArtistDetail {
            artist,
            groups,
            images,
        })
    }

    async fn ensure_slug_free(&self, slug: &str, own_id: Option<i64>) -> Result<(), CatalogError> {
        match self.artist_repo.find_by_slug(slug).await? {
            Some(existing) if Some(existing.id) != own_id => Err(CatalogError::SlugTaken("artist")),
            _ => Ok(()),
        }
    }
}

fn country_code(value: Option<String>) -> Option<Option<String>> {
    normalize_optional(value).map(|c| c.map(|c| c.to_ascii_uppercase()))
}

#[async_trait]
impl<A, G, I> ArtistService for ArtistServiceImpl<A, G, I>
where
    A: ArtistRepository + 'static,
    G: GroupRepository + 'static,
    I: ImageRepository + 'static,
{
    async fn list_artists(&self, query: ListQuery) -> Result<Page<Artist>, CatalogError> {
        let (artists, total) = self.artist_repo.list(&query).await?;
        Ok(Page::new(artists, total, &query))
    }

    async fn get_artist(&self, id: i64) -> Result<ArtistDetail, CatalogError> {
        let artist = self
            .artist_repo
            .find_by_id(id)
            .await?
            .ok_or(CatalogError::NotFound("Artist"))?;
        self.detail(artist).await
    }

    async fn get_artist_by_slug(&self, slug: &str) -> Result<ArtistDetail, CatalogError> {
        let artist = self
            .artist_repo
            .find_by_slug(slug)
            .await?
            .ok_or(CatalogError::NotFound("Artist"))?;
        self.detail(artist).await
    }

    async fn create_artist(&self, request: CreateArtistRequest) -> Result<Artist, CatalogError> {
        let name = request.name.trim().to_string();
        let slug = resolve_slug(request.slug.as_deref(), &name)?;
        self.ensure_slug_free(slug.as_str(), None).await?;

        let mut artist = Artist::new(self.id_generator.generate(), name, slug.into_inner());
        artist.bio = trimmed(request.bio);
        artist.country = country_code(request.country).flatten();
        artist.website_url = trimmed(request.website_url);

        let artist = self.artist_repo.create(&artist).await?;
        tracing::info!(artist_id = artist.id, slug = %artist.slug, "Artist created");
        Ok(artist)
    }

    async fn update_artist(
        &self,
        id: i64,
        update: UpdateArtistRequest,
    ) -> Result<Artist, CatalogError> {
        let mut artist = self
            .artist_repo
            .find_by_id(id)
            .await?
            .ok_or(CatalogError::NotFound("Artist"))?;

        if let Some(name) = update.name {
            artist.name = name.trim().to_string();
        }
        if let Some(slug) = update.slug {
            let slug = resolve_slug(Some(&slug), &artist.name)?;
            if slug.as_str() != artist.slug {
                self.ensure_slug_free(slug.as_str(), Some(id)).await?;
                artist.slug = slug.into_inner();
            }
        }
        if let Some(bio) = normalize_optional(update.bio) {
            artist.bio = bio;
        }
        if let Some(country) = country_code(update.country) {
            artist.country = country;
        }
        if let Some(website_url) = normalize_optional(update.website_url) {
            artist.website_url = website_url;
        }
        artist.updated_at = Utc::now();

        let artist = self.artist_repo.update(&artist).await?;
        tracing::info!(artist_id = id, "Artist updated");
        Ok(artist)
    }

    async fn delete_artist(&self, id: i64) -> Result<(), CatalogError> {
        if !self.artist_repo.delete(id).await? {
            return Err(CatalogError::NotFound("Artist"));
        }
        tracing::info!(artist_id = id, "Artist deleted");
        Ok(())
    }
}
