//! Track Service
//!
//! Tracks, their artist credits and audio registration. A track starts with
//! `pending` audio and becomes `ready` once an uploaded object is attached.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::application::dto::request::{
    CreateTrackRequest, RegisterAudioRequest, TrackArtistInput, UpdateTrackRequest,
};
use crate::application::services::catalog::{
    ensure_all_found, ensure_distinct, resolve_slug, CatalogError,
};
use crate::application::services::upload_service::{UploadError, UploadService};
use crate::domain::{
    mime_essence, ArtistRepository, ContentHash, ListQuery, MediaKind, NewTrackArtist, Page,
    Track, TrackArtist, TrackAudio, TrackCredit, TrackRepository,
};
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;
use crate::shared::validation::normalize_optional;

#[derive(Debug, Clone)]
pub struct TrackDetail {
    pub track: Track,
    pub artists: Vec<TrackArtist>,
}

/// Track service trait
#[async_trait]
pub trait TrackService: Send + Sync {
    async fn list_tracks(&self, query: ListQuery) -> Result<Page<Track>, CatalogError>;

    async fn get_track(&self, id: i64) -> Result<TrackDetail, CatalogError>;

    async fn get_track_by_slug(&self, slug: &str) -> Result<TrackDetail, CatalogError>;

    async fn create_track(&self, request: CreateTrackRequest) -> Result<Track, CatalogError>;

    async fn update_track(&self, id: i64, update: UpdateTrackRequest)
        -> Result<Track, CatalogError>;

    async fn delete_track(&self, id: i64) -> Result<(), CatalogError>;

    /// Replace the credit list. Non-empty lists need a primary artist.
    async fn set_artists(
        &self,
        id: i64,
        artists: Vec<TrackArtistInput>,
    ) -> Result<Vec<TrackArtist>, CatalogError>;

    /// Attach an uploaded audio object and mark the track ready
    async fn register_audio(
        &self,
        id: i64,
        request: RegisterAudioRequest,
    ) -> Result<Track, CatalogError>;
}

/// TrackService implementation
pub struct TrackServiceImpl<T, A>
where
    T: TrackRepository,
    A: ArtistRepository,
{
    track_repo: Arc<T>,
    artist_repo: Arc<A>,
    uploads: Arc<dyn UploadService>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<T, A> TrackServiceImpl<T, A>
where
    T: TrackRepository,
    A: ArtistRepository,
{
    pub fn new(
        track_repo: Arc<T>,
        artist_repo: Arc<A>,
        uploads: Arc<dyn UploadService>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            track_repo,
            artist_repo,
            uploads,
            id_generator,
        }
    }

    async fn require(&self, id: i64) -> Result<Track, CatalogError> {
        self.track_repo
            .find_by_id(id)
            .await?
            .ok_or(CatalogError::NotFound("Track"))
    }

    async fn detail(&self, track: Track) -> Result<TrackDetail, CatalogError> {
        let artists = self.track_repo.artists(track.id).await?;
        Ok(TrackDetail { track, artists })
    }

    async fn ensure_slug_free(&self, slug: &str, own_id: Option<i64>) -> Result<(), CatalogError> {
        match self.track_repo.find_by_slug(slug).await? {
            Some(existing) if Some(existing.id) != own_id => Err(CatalogError::SlugTaken("track")),
            _ => Ok(()),
        }
    }
}

fn isrc(value: Option<String>) -> Option<Option<String>> {
    normalize_optional(value).map(|v| v.map(|v| v.to_ascii_uppercase()))
}

#[async_trait]
impl<T, A> TrackService for TrackServiceImpl<T, A>
where
    T: TrackRepository + 'static,
    A: ArtistRepository + 'static,
{
    async fn list_tracks(&self, query: ListQuery) -> Result<Page<Track>, CatalogError> {
        let (tracks, total) = self.track_repo.list(&query).await?;
        Ok(Page::new(tracks, total, &query))
    }

    async fn get_track(&self, id: i64) -> Result<TrackDetail, CatalogError> {
        let track = self.require(id).await?;
        self.detail(track).await
    }

    async fn get_track_by_slug(&self, slug: &str) -> Result<TrackDetail, CatalogError> {
        let track = self
            .track_repo
            .find_by_slug(slug)
            .await?
            .ok_or(CatalogError::NotFound("Track"))?;
        self.detail(track).await
    }

    async fn create_track(&self, request: CreateTrackRequest) -> Result<Track, CatalogError> {
        let title = request.title.trim().to_string();
        let slug = resolve_slug(request.slug.as_deref(), &title)?;
        self.ensure_slug_free(slug.as_str(), None).await?;

        let mut track = Track::new(self.id_generator.generate(), title, slug.into_inner());
        track.duration_ms = request.duration_ms;
        track.isrc = isrc(request.isrc).flatten();
        track.explicit = request.explicit;

        let track = self.track_repo.create(&track).await?;
        tracing::info!(track_id = track.id, slug = %track.slug, "Track created");
        Ok(track)
    }

    async fn update_track(
        &self,
        id: i64,
        update: UpdateTrackRequest,
    ) -> Result<Track, CatalogError> {
        let mut track = self.require(id).await?;

        if let Some(title) = update.title {
            track.title = title.trim().to_string();
        }
        if let Some(slug) = update.slug {
            let slug = resolve_slug(Some(&slug), &track.title)?;
            if slug.as_str() != track.slug {
                self.ensure_slug_free(slug.as_str(), Some(id)).await?;
                track.slug = slug.into_inner();
            }
        }
        if let Some(duration_ms) = update.duration_ms {
            track.duration_ms = duration_ms;
        }
        if let Some(code) = isrc(update.isrc) {
            track.isrc = code;
        }
        if let Some(explicit) = update.explicit {
            track.explicit = explicit;
        }
        track.updated_at = Utc::now();

        let track = self.track_repo.update(&track).await?;
        tracing::info!(track_id = id, "Track updated");
        Ok(track)
    }

    async fn delete_track(&self, id: i64) -> Result<(), CatalogError> {
        if !self.track_repo.delete(id).await? {
            return Err(CatalogError::NotFound("Track"));
        }
        tracing::info!(track_id = id, "Track deleted");
        Ok(())
    }

    async fn set_artists(
        &self,
        id: i64,
        artists: Vec<TrackArtistInput>,
    ) -> Result<Vec<TrackArtist>, CatalogError> {
        self.require(id).await?;

        let artist_ids: Vec<i64> = artists.iter().map(|a| a.artist_id).collect();
        ensure_distinct(&artist_ids, "artist")?;
        if !artists.is_empty() && !artists.iter().any(|a| a.credit == TrackCredit::Primary) {
            return Err(CatalogError::Invalid(
                "At least one primary artist is required".into(),
            ));
        }
        if !artist_ids.is_empty() {
            let found = self.artist_repo.find_by_ids(&artist_ids).await?;
            ensure_all_found(&artist_ids, found.iter().map(|a| a.id), "artist")?;
        }

        let credits: Vec<NewTrackArtist> = artists
            .into_iter()
            .map(|a| NewTrackArtist {
                artist_id: a.artist_id,
                credit: a.credit,
            })
            .collect();
        let credits = self.track_repo.set_artists(id, &credits).await?;

        tracing::info!(track_id = id, artists = credits.len(), "Track credits replaced");
        Ok(credits)
    }

    async fn register_audio(
        &self,
        id: i64,
        request: RegisterAudioRequest,
    ) -> Result<Track, CatalogError> {
        let upload_error = |e: UploadError| CatalogError::Store(AppError::from(e));

        self.uploads
            .check_key(MediaKind::Audio, &request.key)
            .map_err(upload_error)?;
        self.uploads
            .limits()
            .check(MediaKind::Audio, &request.content_type, request.size)
            .map_err(upload_error)?;
        let hash = ContentHash::parse(&request.content_hash).ok_or_else(|| {
            CatalogError::Invalid("content_hash: must be a SHA-256 hex digest".into())
        })?;

        self.require(id).await?;

        if let Some(owner) = self.track_repo.find_by_content_hash(hash.as_str()).await? {
            if owner.id != id {
                return Err(CatalogError::Conflict(format!(
                    "This audio file is already attached to track {}",
                    owner.id
                )));
            }
        }

        let audio = TrackAudio {
            url: self.uploads.public_url(&request.key),
            key: request.key,
            mime_type: mime_essence(&request.content_type),
            file_size: request.size,
            content_hash: hash.as_str().to_string(),
        };
        let track = self.track_repo.attach_audio(id, &audio).await?;

        tracing::info!(track_id = id, key = %audio.key, "Track audio registered");
        Ok(track)
    }
}
