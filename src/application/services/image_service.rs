//! Image Service
//!
//! Ordered image galleries of artists, groups, releases and profiles.
//! Catalog galleries need the editor role; a profile gallery belongs to its
//! user (admins may edit any).

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::application::dto::request::RegisterImageRequest;
use crate::application::services::catalog::CatalogError;
use crate::application::services::upload_service::{UploadError, UploadService};
use crate::domain::{mime_essence, Image, ImageOwner, ImageRepository, MediaKind, UserRole};
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;
use crate::shared::validation::trimmed;

/// Who is acting on a gallery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i64,
    pub role: UserRole,
}

impl Actor {
    fn can_edit(&self, owner: ImageOwner, owner_id: i64) -> bool {
        match owner {
            ImageOwner::Profile => owner_id == self.user_id || self.role.allows(UserRole::Admin),
            _ => self.role.allows(UserRole::Editor),
        }
    }
}

/// Whether `requested` lists exactly the IDs in `current`, each once.
pub fn is_permutation(current: &[i64], requested: &[i64]) -> bool {
    if current.len() != requested.len() {
        return false;
    }
    let current: HashSet<i64> = current.iter().copied().collect();
    let mut seen = HashSet::with_capacity(requested.len());
    requested
        .iter()
        .all(|id| current.contains(id) && seen.insert(*id))
}

/// Image service trait
#[async_trait]
pub trait ImageService: Send + Sync {
    async fn list_images(&self, owner: ImageOwner, owner_id: i64)
        -> Result<Vec<Image>, CatalogError>;

    /// Register an uploaded image, appended after the owner's last image
    async fn register_image(
        &self,
        actor: Actor,
        owner: ImageOwner,
        owner_id: i64,
        request: RegisterImageRequest,
    ) -> Result<Image, CatalogError>;

    /// Rewrite positions to follow `image_ids`, an exact permutation
    async fn reorder_images(
        &self,
        actor: Actor,
        owner: ImageOwner,
        owner_id: i64,
        image_ids: Vec<i64>,
    ) -> Result<Vec<Image>, CatalogError>;

    async fn delete_image(&self, actor: Actor, image_id: i64) -> Result<(), CatalogError>;
}

/// ImageService implementation
pub struct ImageServiceImpl<I: ImageRepository> {
    image_repo: Arc<I>,
    uploads: Arc<dyn UploadService>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<I: ImageRepository> ImageServiceImpl<I> {
    pub fn new(
        image_repo: Arc<I>,
        uploads: Arc<dyn UploadService>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            image_repo,
            uploads,
            id_generator,
        }
    }

    async fn require_owner(&self, owner: ImageOwner, owner_id: i64) -> Result<(), CatalogError> {
        if self.image_repo.owner_exists(owner, owner_id).await? {
            Ok(())
        } else {
            Err(CatalogError::NotFound(owner_label(owner)))
        }
    }
}

fn owner_label(owner: ImageOwner) -> &'static str {
    match owner {
        ImageOwner::Artist => "Artist",
        ImageOwner::Group => "Group",
        ImageOwner::Release => "Release",
        ImageOwner::Profile => "Profile",
    }
}

fn authorize(actor: &Actor, owner: ImageOwner, owner_id: i64) -> Result<(), CatalogError> {
    if actor.can_edit(owner, owner_id) {
        Ok(())
    } else {
        Err(CatalogError::Forbidden("You cannot edit these images"))
    }
}

#[async_trait]
impl<I: ImageRepository + 'static> ImageService for ImageServiceImpl<I> {
    async fn list_images(
        &self,
        owner: ImageOwner,
        owner_id: i64,
    ) -> Result<Vec<Image>, CatalogError> {
        self.require_owner(owner, owner_id).await?;
        Ok(self.image_repo.list_for_owner(owner, owner_id).await?)
    }

    async fn register_image(
        &self,
        actor: Actor,
        owner: ImageOwner,
        owner_id: i64,
        request: RegisterImageRequest,
    ) -> Result<Image, CatalogError> {
        authorize(&actor, owner, owner_id)?;

        let upload_error = |e: UploadError| CatalogError::Store(AppError::from(e));
        self.uploads
            .check_key(MediaKind::Image, &request.key)
            .map_err(upload_error)?;
        self.uploads
            .limits()
            .check(MediaKind::Image, &request.content_type, request.size)
            .map_err(upload_error)?;

        self.require_owner(owner, owner_id).await?;

        let image = Image {
            id: self.id_generator.generate(),
            owner_kind: owner,
            owner_id,
            url: self.uploads.public_url(&request.key),
            storage_key: request.key,
            alt_text: trimmed(request.alt_text),
            width: request.width,
            height: request.height,
            content_type: mime_essence(&request.content_type),
            size_bytes: request.size,
            position: 0,
            created_at: Utc::now(),
        };
        let image = self.image_repo.create(&image).await?;

        tracing::info!(
            image_id = image.id,
            owner = %owner,
            owner_id,
            position = image.position,
            "Image registered"
        );
        Ok(image)
    }

    async fn reorder_images(
        &self,
        actor: Actor,
        owner: ImageOwner,
        owner_id: i64,
        image_ids: Vec<i64>,
    ) -> Result<Vec<Image>, CatalogError> {
        authorize(&actor, owner, owner_id)?;
        self.require_owner(owner, owner_id).await?;

        let current: Vec<i64> = self
            .image_repo
            .list_for_owner(owner, owner_id)
            .await?
            .iter()
            .map(|image| image.id)
            .collect();
        if !is_permutation(&current, &image_ids) {
            return Err(CatalogError::Invalid(
                "image_ids must list each of the owner's images exactly once".into(),
            ));
        }

        let images = self.image_repo.reorder(owner, owner_id, &image_ids).await?;
        tracing::info!(owner = %owner, owner_id, images = images.len(), "Images reordered");
        Ok(images)
    }

    async fn delete_image(&self, actor: Actor, image_id: i64) -> Result<(), CatalogError> {
        let image = self
            .image_repo
            .find_by_id(image_id)
            .await?
            .ok_or(CatalogError::NotFound("Image"))?;
        authorize(&actor, image.owner_kind, image.owner_id)?;

        if !self.image_repo.delete(image_id).await? {
            return Err(CatalogError::NotFound("Image"));
        }
        tracing::info!(image_id, owner = %image.owner_kind, owner_id = image.owner_id, "Image deleted");
        Ok(())
    }
}
