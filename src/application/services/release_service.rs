//! Release Service
//!
//! Releases with their tracklists and credited artists.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::application::dto::request::{
    CreateReleaseRequest, ReleaseTrackInput, UpdateReleaseRequest,
};
use crate::application::services::catalog::{
    ensure_all_found, ensure_distinct, resolve_slug, CatalogError,
};
use crate::domain::{
    ArtistRepository, ArtistSummary, Image, ImageOwner, ImageRepository, ListQuery,
    NewReleaseTrack, Page, Release, ReleaseRepository, ReleaseTrack, TrackRepository,
};
use crate::shared::snowflake::SnowflakeGenerator;
use crate::shared::validation::{normalize_optional, trimmed};

#[derive(Debug, Clone)]
pub struct ReleaseDetail {
    pub release: Release,
    pub artists: Vec<ArtistSummary>,
    pub tracks: Vec<ReleaseTrack>,
    pub images: Vec<Image>,
}

/// Release service trait
#[async_trait]
pub trait ReleaseService: Send + Sync {
    async fn list_releases(&self, query: ListQuery) -> Result<Page<Release>, CatalogError>;

    async fn get_release(&self, id: i64) -> Result<ReleaseDetail, CatalogError>;

    async fn get_release_by_slug(&self, slug: &str) -> Result<ReleaseDetail, CatalogError>;

    async fn create_release(&self, request: CreateReleaseRequest)
        -> Result<Release, CatalogError>;

    async fn update_release(
        &self,
        id: i64,
        update: UpdateReleaseRequest,
    ) -> Result<Release, CatalogError>;

    async fn delete_release(&self, id: i64) -> Result<(), CatalogError>;

    /// Replace the tracklist. Positions restart at 1 on every disc.
    async fn set_tracks(
        &self,
        id: i64,
        tracks: Vec<ReleaseTrackInput>,
    ) -> Result<Vec<ReleaseTrack>, CatalogError>;

    async fn set_artists(
        &self,
        id: i64,
        artist_ids: Vec<i64>,
    ) -> Result<Vec<ArtistSummary>, CatalogError>;
}

/// Assign `(disc, position)` to each entry, keeping input order within a disc.
pub fn number_tracklist(tracks: &[ReleaseTrackInput]) -> Vec<NewReleaseTrack> {
    let mut next_position: HashMap<i32, i32> = HashMap::new();
    tracks
        .iter()
        .map(|t| {
            let disc_number = t.disc_number.unwrap_or(1);
            let position = next_position.entry(disc_number).or_insert(0);
            *position += 1;
            NewReleaseTrack {
                track_id: t.track_id,
                disc_number,
                position: *position,
            }
        })
        .collect()
}

/// ReleaseService implementation
pub struct ReleaseServiceImpl<R, T, A, I>
where
    R: ReleaseRepository,
    T: TrackRepository,
    A: ArtistRepository,
    I: ImageRepository,
{
    release_repo: Arc<R>,
    track_repo: Arc<T>,
    artist_repo: Arc<A>,
    image_repo: Arc<I>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<R, T, A, I> ReleaseServiceImpl<R, T, A, I>
where
    R: ReleaseRepository,
    T: TrackRepository,
    A: ArtistRepository,
    I: ImageRepository,
{
    pub fn new(
        release_repo: Arc<R>,
        track_repo: Arc<T>,
        artist_repo: Arc<A>,
        image_repo: Arc<I>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            release_repo,
            track_repo,
            artist_repo,
            image_repo,
            id_generator,
        }
    }

    async fn require(&self, id: i64) -> Result<Release, CatalogError> {
        self.release_repo
            .find_by_id(id)
            .await?
            .ok_or(CatalogError::NotFound("Release"))
    }

    async fn detail(&self, release: Release) -> Result<ReleaseDetail, CatalogError> {
        let artists = self.release_repo.artists(release.id).await?;
        let tracks = self.release_repo.tracks(release.id).await?;
        let images = self
            .image_repo
            .list_for_owner(ImageOwner::Release, release.id)
            .await?;
        Ok(ReleaseDetail {
            release,
            artists,
            tracks,
            images,
        })
    }

    async fn ensure_slug_free(&self, slug: &str, own_id: Option<i64>) -> Result<(), CatalogError> {
        match self.release_repo.find_by_slug(slug).await? {
            Some(existing) if Some(existing.id) != own_id => {
                Err(CatalogError::SlugTaken("release"))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl<R, T, A, I> ReleaseService for ReleaseServiceImpl<R, T, A, I>
where
    R: ReleaseRepository + 'static,
    T: TrackRepository + 'static,
    A: ArtistRepository + 'static,
    I: ImageRepository + 'static,
{
    async fn list_releases(&self, query: ListQuery) -> Result<Page<Release>, CatalogError> {
        let (releases, total) = self.release_repo.list(&query).await?;
        Ok(Page::new(releases, total, &query))
    }

    async fn get_release(&self, id: i64) -> Result<ReleaseDetail, CatalogError> {
        let release = self.require(id).await?;
        self.detail(release).await
    }

    async fn get_release_by_slug(&self, slug: &str) -> Result<ReleaseDetail, CatalogError> {
        let release = self
            .release_repo
            .find_by_slug(slug)
            .await?
            .ok_or(CatalogError::NotFound("Release"))?;
        self.detail(release).await
    }

    async fn create_release(
        &self,
        request: CreateReleaseRequest,
    ) -> Result<Release, CatalogError> {
        let title = request.title.trim().to_string();
        let slug = resolve_slug(request.slug.as_deref(), &title)?;
        self.ensure_slug_free(slug.as_str(), None).await?;

        let mut release = Release::new(
            self.id_generator.generate(),
            title,
            slug.into_inner(),
            request.release_type,
        );
        release.release_date = request.release_date;
        release.label = trimmed(request.label);
        release.description = trimmed(request.description);
        release.published = request.published;

        let release = self.release_repo.create(&release).await?;
        tracing::info!(release_id = release.id, slug = %release.slug, "Release created");
        Ok(release)
    }

    async fn update_release(
        &self,
        id: i64,
        update: UpdateReleaseRequest,
    ) -> Result<Release, CatalogError> {
        let mut release = self.require(id).await?;

        if let Some(title) = update.title {
            release.title = title.trim().to_string();
        }
        if let Some(slug) = update.slug {
            let slug = resolve_slug(Some(&slug), &release.title)?;
            if slug.as_str() != release.slug {
                self.ensure_slug_free(slug.as_str(), Some(id)).await?;
                release.slug = slug.into_inner();
            }
        }
        if let Some(release_type) = update.release_type {
            release.release_type = release_type;
        }
        if let Some(release_date) = update.release_date {
            release.release_date = release_date;
        }
        if let Some(label) = normalize_optional(update.label) {
            release.label = label;
        }
        if let Some(description) = normalize_optional(update.description) {
            release.description = description;
        }
        if let Some(published) = update.published {
            release.published = published;
        }
        release.updated_at = Utc::now();

        let release = self.release_repo.update(&release).await?;
        tracing::info!(release_id = id, "Release updated");
        Ok(release)
    }

    async fn delete_release(&self, id: i64) -> Result<(), CatalogError> {
        if !self.release_repo.delete(id).await? {
            return Err(CatalogError::NotFound("Release"));
        }
        tracing::info!(release_id = id, "Release deleted");
        Ok(())
    }

    async fn set_tracks(
        &self,
        id: i64,
        tracks: Vec<ReleaseTrackInput>,
    ) -> Result<Vec<ReleaseTrack>, CatalogError> {
        self.require(id).await?;

        let track_ids: Vec<i64> = tracks.iter().map(|t| t.track_id).collect();
        ensure_distinct(&track_ids, "track")?;
        if !track_ids.is_empty() {
            let found = self.track_repo.find_by_ids(&track_ids).await?;
            ensure_all_found(&track_ids, found.iter().map(|t| t.id), "track")?;
        }

        let tracklist = number_tracklist(&tracks);
        let tracklist = self.release_repo.set_tracks(id, &tracklist).await?;

        tracing::info!(release_id = id, tracks = tracklist.len(), "Tracklist replaced");
        Ok(tracklist)
    }

    async fn set_artists(
        &self,
        id: i64,
        artist_ids: Vec<i64>,
    ) -> Result<Vec<ArtistSummary>, CatalogError> {
        self.require(id).await?;

        ensure_distinct(&artist_ids, "artist")?;
        if !artist_ids.is_empty() {
            let found = self.artist_repo.find_by_ids(&artist_ids).await?;
            ensure_all_found(&artist_ids, found.iter().map(|a| a.id), "artist")?;
        }

        let artists = self.release_repo.set_artists(id, &artist_ids).await?;
        tracing::info!(release_id = id, artists = artists.len(), "Release credits replaced");
        Ok(artists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        MockArtistRepository, MockImageRepository, MockReleaseRepository, MockTrackRepository,
        ReleaseType, Track,
    };
    use crate::shared::error::AppError;
    use axum::http::StatusCode;
    use pretty_assertions::assert_eq;

    type Service = ReleaseServiceImpl<
        MockReleaseRepository,
        MockTrackRepository,
        MockArtistRepository,
        MockImageRepository,
    >;

    fn service(releases: MockReleaseRepository, tracks: MockTrackRepository) -> Service {
        ReleaseServiceImpl::new(
            Arc::new(releases),
            Arc::new(tracks),
            Arc::new(MockArtistRepository::new()),
            Arc::new(MockImageRepository::new()),
            Arc::new(SnowflakeGenerator::new(1, crate::shared::snowflake::DEFAULT_EPOCH)),
        )
    }

    fn existing_release() -> MockReleaseRepository {
        let mut releases = MockReleaseRepository::new();
        releases.expect_find_by_id().returning(|id| {
            Ok(Some(Release::new(
                id,
                "Mezzanine".into(),
                "mezzanine".into(),
                ReleaseType::Album,
            )))
        });
        releases
    }

    fn entry(track_id: i64, disc_number: Option<i32>) -> ReleaseTrackInput {
        ReleaseTrackInput {
            track_id,
            disc_number,
        }
    }

    #[test]
    fn test_number_tracklist_per_disc() {
        let numbered = number_tracklist(&[
            entry(10, None),
            entry(11, Some(2)),
            entry(12, Some(1)),
            entry(13, Some(2)),
        ]);
        let positions: Vec<(i64, i32, i32)> = numbered
            .iter()
            .map(|t| (t.track_id, t.disc_number, t.position))
            .collect();
        assert_eq!(
            positions,
            vec![(10, 1, 1), (11, 2, 1), (12, 1, 2), (13, 2, 2)]
        );
    }

    #[tokio::test]
    async fn test_set_tracks_rejects_unknown_track() {
        let mut releases = existing_release();
        releases.expect_set_tracks().never();
        let mut tracks = MockTrackRepository::new();
        tracks
            .expect_find_by_ids()
            .returning(|_| Ok(vec![Track::new(10, "Angel".into(), "angel".into())]));

        let err = service(releases, tracks)
            .set_tracks(1, vec![entry(10, None), entry(11, None)])
            .await
            .unwrap_err();
        assert_eq!(AppError::from(err).status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_set_tracks_rejects_duplicate_track() {
        let mut releases = existing_release();
        releases.expect_set_tracks().never();

        let err = service(releases, MockTrackRepository::new())
            .set_tracks(1, vec![entry(10, Some(1)), entry(10, Some(2))])
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateReference(_)));
    }

    #[tokio::test]
    async fn test_set_tracks_passes_numbered_list() {
        let mut releases = existing_release();
        releases
            .expect_set_tracks()
            .withf(|_, list| list.iter().map(|t| t.position).collect::<Vec<_>>() == vec![1, 2])
            .returning(|_, list| {
                Ok(list
                    .iter()
                    .map(|t| ReleaseTrack {
                        track_id: t.track_id,
                        title: format!("Track {}", t.track_id),
                        slug: format!("track-{}", t.track_id),
                        duration_ms: None,
                        disc_number: t.disc_number,
                        position: t.position,
                    })
                    .collect())
            });
        let mut tracks = MockTrackRepository::new();
        tracks.expect_find_by_ids().returning(|ids| {
            Ok(ids
                .iter()
                .map(|id| Track::new(*id, format!("Track {}", id), format!("track-{}", id)))
                .collect())
        });

        let list = service(releases, tracks)
            .set_tracks(1, vec![entry(12, None), entry(10, None)])
            .await
            .unwrap();
        assert_eq!(list[0].track_id, 12);
        assert_eq!(list[1].position, 2);
    }

    #[tokio::test]
    async fn test_update_clears_release_date() {
        let mut releases = MockReleaseRepository::new();
        releases.expect_find_by_id().returning(|id| {
            let mut release =
                Release::new(id, "Blue Lines".into(), "blue-lines".into(), ReleaseType::Album);
            release.release_date = chrono::NaiveDate::from_ymd_opt(1991, 4, 8);
            Ok(Some(release))
        });
        releases.expect_update().returning(|r| Ok(r.clone()));

        let release = service(releases, MockTrackRepository::new())
            .update_release(
                1,
                UpdateReleaseRequest {
                    release_date: Some(None),
                    release_type: Some(ReleaseType::Compilation),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(release.release_date, None);
        assert_eq!(release.release_type, ReleaseType::Compilation);
    }
}
