//! Bulk Track Upload Service
//!
//! Two steps, both driven by the browser:
//!
//! 1. **analyze**: the browser hashes each selected file and sends the
//!    list. Every file is screened (type, size, hash), checked for
//!    duplicates inside the batch and against stored tracks, and gets
//!    metadata from its tags and filename. Stored-duplicate lookups run
//!    with a bounded concurrency and the report keeps input order.
//! 2. **commit**: for the files the user kept, a pending track is created
//!    and a presigned audio upload returned. The browser uploads and then
//!    registers the audio on the track.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};

use crate::application::dto::request::{BulkCommitItem, BulkFileInput, PresignUploadRequest};
use crate::application::dto::{
    BulkAnalysisResponse, BulkCommitResponse, BulkCommitResult, BulkCommitStatus,
    BulkItemReport, BulkItemStatus, BulkSummary,
};
use crate::application::services::upload_service::{UploadError, UploadService};
use crate::config::UploadSettings;
use crate::domain::{
    extract_from_filename, ArtistRepository, ContentHash, MediaKind, NewTrackArtist, Slug,
    Track, TrackCredit, TrackRepository,
};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;

/// Slug suffixes tried before giving up on a title.
const MAX_SLUG_ATTEMPTS: u32 = 100;

/// Bulk upload errors. Only `TooManyFiles` fails a whole commit; during a
/// commit the others are reported per file.
#[derive(Debug, thiserror::Error)]
pub enum BulkUploadError {
    #[error("At most {0} files per batch")]
    TooManyFiles(usize),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<BulkUploadError> for AppError {
    fn from(err: BulkUploadError) -> Self {
        match err {
            BulkUploadError::TooManyFiles(_) => AppError::BadRequest(err.to_string()),
            BulkUploadError::Upload(e) => e.into(),
            BulkUploadError::Store(inner) => inner,
        }
    }
}

/// Bulk upload service trait
#[async_trait]
pub trait BulkUploadService: Send + Sync {
    async fn analyze(&self, files: Vec<BulkFileInput>)
        -> Result<BulkAnalysisResponse, BulkUploadError>;

    async fn commit(&self, files: Vec<BulkCommitItem>)
        -> Result<BulkCommitResponse, BulkUploadError>;
}

/// Result of the checks that need no database access
enum Screened {
    Done(BulkItemReport),
    Candidate {
        index: usize,
        file: BulkFileInput,
        hash: ContentHash,
    },
}

/// BulkUploadService implementation
pub struct BulkUploadServiceImpl<T, A>
where
    T: TrackRepository,
    A: ArtistRepository,
{
    track_repo: Arc<T>,
    artist_repo: Arc<A>,
    uploads: Arc<dyn UploadService>,
    id_generator: Arc<SnowflakeGenerator>,
    concurrency: usize,
    max_files: usize,
}

impl<T, A> BulkUploadServiceImpl<T, A>
where
    T: TrackRepository,
    A: ArtistRepository,
{
    pub fn new(
        track_repo: Arc<T>,
        artist_repo: Arc<A>,
        uploads: Arc<dyn UploadService>,
        id_generator: Arc<SnowflakeGenerator>,
        settings: &UploadSettings,
    ) -> Self {
        Self {
            track_repo,
            artist_repo,
            uploads,
            id_generator,
            concurrency: settings.bulk_concurrency.max(1),
            max_files: settings.bulk_max_files,
        }
    }

    fn check_batch_size(&self, len: usize) -> Result<(), BulkUploadError> {
        if len > self.max_files {
            Err(BulkUploadError::TooManyFiles(self.max_files))
        } else {
            Ok(())
        }
    }

    /// Type, size and hash checks plus in-batch duplicates, in input order.
    fn screen(&self, files: Vec<BulkFileInput>) -> Vec<Screened> {
        let limits = self.uploads.limits();
        let mut first_seen: HashMap<ContentHash, usize> = HashMap::new();

        files
            .into_iter()
            .enumerate()
            .map(|(index, file)| {
                if let Err(e) = limits.check(MediaKind::Audio, &file.content_type, file.size) {
                    return Screened::Done(BulkItemReport::rejected(index, file.filename, e.to_string()));
                }
                let Some(hash) = ContentHash::parse(&file.content_hash) else {
                    return Screened::Done(BulkItemReport::rejected(
                        index,
                        file.filename,
                        "Content hash must be a SHA-256 hex digest",
                    ));
                };
                if let Some(&first) = first_seen.get(&hash) {
                    let mut report =
                        BulkItemReport::new(index, file.filename, BulkItemStatus::DuplicateInBatch);
                    report.reason = Some(format!("Same file as item {}", first));
                    report.duplicate_of_index = Some(first);
                    report.content_hash = Some(hash.to_string());
                    return Screened::Done(report);
                }
                first_seen.insert(hash.clone(), index);
                Screened::Candidate { index, file, hash }
            })
            .collect()
    }

    async fn resolve(&self, item: Screened) -> Result<BulkItemReport, AppError> {
        let (index, file, hash) = match item {
            Screened::Done(report) => return Ok(report),
            Screened::Candidate { index, file, hash } => (index, file, hash),
        };

        if let Some(existing) = self.track_repo.find_by_content_hash(hash.as_str()).await? {
            let mut report = BulkItemReport::new(index, file.filename, BulkItemStatus::Duplicate);
            report.reason = Some(format!("Already uploaded as \"{}\"", existing.title));
            report.duplicate_of_track = Some(existing.id.to_string());
            report.content_hash = Some(hash.to_string());
            return Ok(report);
        }

        let mut metadata = file
            .tags
            .unwrap_or_default()
            .merged_with(extract_from_filename(&file.filename));
        if metadata.title.is_none() {
            metadata.title = Some(file.filename.clone());
        }

        let (artist_ids, unresolved) = self.resolve_artists(&metadata.artists, &metadata.featured_artists).await?;

        let mut report = BulkItemReport::new(index, file.filename, BulkItemStatus::Ready);
        report.content_hash = Some(hash.to_string());
        report.metadata = Some(metadata);
        report.artist_ids = artist_ids.iter().map(i64::to_string).collect();
        report.unresolved_artists = unresolved;
        Ok(report)
    }

    /// Match artist names to stored artists by slug. Returns the IDs of
    /// matched primary artists and every name that matched nothing.
    async fn resolve_artists(
        &self,
        primary: &[String],
        featured: &[String],
    ) -> Result<(Vec<i64>, Vec<String>), AppError> {
        let names: Vec<(&String, Option<Slug>)> = primary
            .iter()
            .chain(featured)
            .map(|name| (name, Slug::from_name(name)))
            .collect();
        let slugs: Vec<String> = names
            .iter()
            .filter_map(|(_, slug)| slug.as_ref().map(|s| s.as_str().to_string()))
            .collect();

        let known: HashMap<String, i64> = if slugs.is_empty() {
            HashMap::new()
        } else {
            self.artist_repo
                .find_by_slugs(&slugs)
                .await?
                .into_iter()
                .map(|artist| (artist.slug, artist.id))
                .collect()
        };

        let mut artist_ids = Vec::new();
        let mut unresolved = Vec::new();
        for (i, (name, slug)) in names.into_iter().enumerate() {
            match slug.and_then(|s| known.get(s.as_str()).copied()) {
                Some(id) if i < primary.len() => {
                    if !artist_ids.contains(&id) {
                        artist_ids.push(id);
                    }
                }
                Some(_) => {}
                None => unresolved.push(name.clone()),
            }
        }
        Ok((artist_ids, unresolved))
    }

    /// First free slug among `base`, `base-2`, `base-3`, ...
    async fn free_slug(&self, base: &Slug) -> Result<Option<Slug>, AppError> {
        for n in 1..=MAX_SLUG_ATTEMPTS {
            let candidate = if n == 1 { base.clone() } else { base.with_suffix(n) };
            if self.track_repo.find_by_slug(candidate.as_str()).await?.is_none() {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }

    async fn commit_one(
        &self,
        index: usize,
        file: BulkCommitItem,
        seen: &mut HashSet<ContentHash>,
    ) -> Result<BulkCommitResult, BulkUploadError> {
        let skip = |status: BulkCommitStatus,
                    reason: String|
         -> Result<BulkCommitResult, BulkUploadError> {
            Ok(BulkCommitResult::skipped(index, file.filename.clone(), status, reason))
        };

        if let Err(e) = self
            .uploads
            .limits()
            .check(MediaKind::Audio, &file.content_type, file.size)
        {
            return skip(BulkCommitStatus::Rejected, e.to_string());
        }
        let Some(hash) = ContentHash::parse(&file.content_hash) else {
            return skip(
                BulkCommitStatus::Rejected,
                "Content hash must be a SHA-256 hex digest".into(),
            );
        };
        if !seen.insert(hash.clone()) {
            return skip(BulkCommitStatus::Duplicate, "Same file appears earlier in the batch".into());
        }
        if let Some(existing) = self.track_repo.find_by_content_hash(hash.as_str()).await? {
            return skip(
                BulkCommitStatus::Duplicate,
                format!("Already uploaded as track {}", existing.id),
            );
        }

        let mut artist_ids = Vec::with_capacity(file.artist_ids.len());
        for id in &file.artist_ids {
            if !artist_ids.contains(id) {
                artist_ids.push(*id);
            }
        }
        if !artist_ids.is_empty() {
            let found: HashSet<i64> = self
                .artist_repo
                .find_by_ids(&artist_ids)
                .await?
                .iter()
                .map(|a| a.id)
                .collect();
            if let Some(missing) = artist_ids.iter().find(|id| !found.contains(id)) {
                return skip(BulkCommitStatus::Rejected, format!("Unknown artist: {}", missing));
            }
        }

        let title = file.title.trim().to_string();
        let Some(base) = Slug::from_name(&title) else {
            return skip(
                BulkCommitStatus::Rejected,
                "Title must contain letters or digits".into(),
            );
        };
        let upload = self.uploads.presign(&PresignUploadRequest {
            kind: MediaKind::Audio,
            filename: file.filename.clone(),
            content_type: file.content_type.clone(),
            size: file.size,
        })?;

        // A concurrent insert can claim the slug between lookup and insert;
        // look again once before giving up on the file.
        let mut retried = false;
        let track = loop {
            let Some(slug) = self.free_slug(&base).await? else {
                return skip(
                    BulkCommitStatus::Rejected,
                    format!("No free slug for \"{}\"", title),
                );
            };
            let mut track = Track::new(self.id_generator.generate(), title.clone(), slug.into_inner());
            track.duration_ms = file.duration_ms;
            track.content_hash = Some(hash.to_string());
            match self.track_repo.create(&track).await {
                Ok(track) => break track,
                Err(AppError::Conflict(_)) if !retried => {
                    tracing::debug!(index, slug = %track.slug, "Slug claimed concurrently, retrying");
                    retried = true;
                }
                Err(e) => return Err(e.into()),
            }
        };

        if !artist_ids.is_empty() {
            let credits: Vec<NewTrackArtist> = artist_ids
                .iter()
                .map(|&artist_id| NewTrackArtist {
                    artist_id,
                    credit: TrackCredit::Primary,
                })
                .collect();
            if let Err(e) = self.track_repo.set_artists(track.id, &credits).await {
                // No uncredited track holding the hash
                if let Err(cleanup) = self.track_repo.delete(track.id).await {
                    tracing::warn!(track_id = track.id, error = %cleanup, "Could not remove track after failed artist link");
                }
                return Err(e.into());
            }
        }

        tracing::info!(track_id = track.id, slug = %track.slug, index, "Pending track created from bulk upload");

        Ok(BulkCommitResult {
            index,
            filename: file.filename,
            status: BulkCommitStatus::Created,
            reason: None,
            track_id: Some(track.id.to_string()),
            slug: Some(track.slug),
            upload: Some(upload),
        })
    }
}

/// Client-facing reason for a failed item. Only conflicts carry a message
/// meant for clients.
fn failure_reason(err: &BulkUploadError) -> String {
    match err {
        BulkUploadError::Store(AppError::Conflict(msg)) => msg.clone(),
        _ => "Could not create the track".into(),
    }
}

#[async_trait]
impl<T, A> BulkUploadService for BulkUploadServiceImpl<T, A>
where
    T: TrackRepository + 'static,
    A: ArtistRepository + 'static,
{
    async fn analyze(
        &self,
        files: Vec<BulkFileInput>,
    ) -> Result<BulkAnalysisResponse, BulkUploadError> {
        self.check_batch_size(files.len())?;
        let total = files.len();

        let items: Vec<BulkItemReport> = stream::iter(self.screen(files))
            .map(|item| self.resolve(item))
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        for item in &items {
            metrics::record_bulk_item(item.status.as_str());
        }
        let summary = BulkSummary::of(&items);
        tracing::info!(
            files = total,
            ready = summary.ready,
            duplicates = summary.duplicates,
            rejected = summary.rejected,
            "Bulk upload analyzed"
        );

        Ok(BulkAnalysisResponse { items, summary })
    }

    async fn commit(
        &self,
        files: Vec<BulkCommitItem>,
    ) -> Result<BulkCommitResponse, BulkUploadError> {
        self.check_batch_size(files.len())?;

        let mut seen = HashSet::new();
        let mut items = Vec::with_capacity(files.len());
        for (index, file) in files.into_iter().enumerate() {
            let filename = file.filename.clone();
            let result = match self.commit_one(index, file, &mut seen).await {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!(index, error = %e, "Bulk commit item failed");
                    BulkCommitResult::skipped(
                        index,
                        filename,
                        BulkCommitStatus::Failed,
                        failure_reason(&e),
                    )
                }
            };
            items.push(result);
        }

        let created = items
            .iter()
            .filter(|r| r.status == BulkCommitStatus::Created)
            .count();
        tracing::info!(files = items.len(), created, "Bulk upload committed");

        Ok(BulkCommitResponse { items, created })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::upload_service::{UploadLimits, UploadServiceImpl};
    use crate::domain::{Artist, MockArtistRepository, MockTrackRepository, TrackMetadata};
    use crate::infrastructure::storage::{MockObjectStorage, PresignedRequest};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    fn hash(n: u8) -> String {
        ContentHash::of(&[n]).to_string()
    }

    fn file(name: &str, content_type: &str, hash: String) -> BulkFileInput {
        BulkFileInput {
            filename: name.into(),
            content_type: content_type.into(),
            size: 4096,
            content_hash: hash,
            tags: None,
        }
    }

    fn uploads() -> Arc<dyn UploadService> {
        let mut storage = MockObjectStorage::new();
        storage.expect_presign_put().returning(|key, _, expires_in| {
            Ok(PresignedRequest {
                url: format!("https://bucket.example.com/{}?sig", key),
                method: "PUT",
                headers: BTreeMap::new(),
                expires_in: expires_in.as_secs(),
            })
        });
        storage
            .expect_public_url()
            .returning(|key| format!("https://cdn.example.com/{}", key));
        Arc::new(UploadServiceImpl::new(
            Arc::new(storage),
            UploadLimits {
                max_image_bytes: 1024,
                max_audio_bytes: 1024 * 1024,
            },
            900,
        ))
    }

    fn settings(max_files: usize) -> UploadSettings {
        UploadSettings {
            max_image_bytes: 1024,
            max_audio_bytes: 1024 * 1024,
            bulk_concurrency: 3,
            bulk_max_files: max_files,
        }
    }

    fn service(
        tracks: MockTrackRepository,
        artists: MockArtistRepository,
    ) -> BulkUploadServiceImpl<MockTrackRepository, MockArtistRepository> {
        BulkUploadServiceImpl::new(
            Arc::new(tracks),
            Arc::new(artists),
            uploads(),
            Arc::new(SnowflakeGenerator::new(1, crate::shared::snowflake::DEFAULT_EPOCH)),
            &settings(10),
        )
    }

    fn known_artists() -> MockArtistRepository {
        let mut artists = MockArtistRepository::new();
        artists.expect_find_by_slugs().returning(|slugs| {
            Ok(slugs
                .iter()
                .filter(|s| s.as_str() == "daft-punk")
                .map(|s| Artist::new(100, "Daft Punk".into(), s.to_string()))
                .collect())
        });
        artists
    }

    #[tokio::test]
    async fn test_analyze_preserves_order_and_flags_everything() {
        let stored = hash(9);
        let mut tracks = MockTrackRepository::new();
        tracks.expect_find_by_content_hash().returning(move |h| {
            if h == stored {
                Ok(Some(Track::new(55, "One More Time".into(), "one-more-time".into())))
            } else {
                Ok(None)
            }
        });

        let files = vec![
            file("01 - Daft Punk - Digital Love.mp3", "audio/mpeg", hash(1)),
            file("cover.jpg", "image/jpeg", hash(2)),
            file("02 - Daft Punk - Digital Love (copy).mp3", "audio/mpeg", hash(1)),
            file("One More Time.flac", "audio/flac", hash(9)),
            file("broken.mp3", "audio/mpeg", "xyz".into()),
            file("Unknown Band - Song (feat. Daft Punk).ogg", "audio/ogg", hash(3)),
        ];

        let response = service(tracks, known_artists()).analyze(files).await.unwrap();
        let statuses: Vec<(usize, BulkItemStatus)> =
            response.items.iter().map(|i| (i.index, i.status)).collect();
        assert_eq!(
            statuses,
            vec![
                (0, BulkItemStatus::Ready),
                (1, BulkItemStatus::Rejected),
                (2, BulkItemStatus::DuplicateInBatch),
                (3, BulkItemStatus::Duplicate),
                (4, BulkItemStatus::Rejected),
                (5, BulkItemStatus::Ready),
            ]
        );

        assert_eq!(response.items[2].duplicate_of_index, Some(0));
        assert_eq!(response.items[3].duplicate_of_track.as_deref(), Some("55"));

        let first = &response.items[0];
        assert_eq!(first.artist_ids, vec!["100".to_string()]);
        let metadata = first.metadata.as_ref().unwrap();
        assert_eq!(metadata.title.as_deref(), Some("Digital Love"));
        assert_eq!(metadata.track_number, Some(1));

        let last = &response.items[5];
        assert!(last.artist_ids.is_empty());
        assert_eq!(last.unresolved_artists, vec!["Unknown Band".to_string()]);

        assert_eq!(
            response.summary,
            BulkSummary {
                ready: 2,
                duplicates: 2,
                rejected: 2
            }
        );
    }

    #[tokio::test]
    async fn test_analyze_client_tags_win() {
        let mut tracks = MockTrackRepository::new();
        tracks.expect_find_by_content_hash().returning(|_| Ok(None));

        let mut input = file("track01.mp3", "audio/mpeg", hash(1));
        input.tags = Some(TrackMetadata {
            title: Some("Harder, Better, Faster, Stronger".into()),
            artists: vec!["Daft Punk".into()],
            ..Default::default()
        });

        let response = service(tracks, known_artists())
            .analyze(vec![input])
            .await
            .unwrap();
        let item = &response.items[0];
        assert_eq!(
            item.metadata.as_ref().and_then(|m| m.title.as_deref()),
            Some("Harder, Better, Faster, Stronger")
        );
        assert_eq!(item.artist_ids, vec!["100".to_string()]);
    }

    #[tokio::test]
    async fn test_analyze_rejects_oversized_batch() {
        let service = BulkUploadServiceImpl::new(
            Arc::new(MockTrackRepository::new()),
            Arc::new(MockArtistRepository::new()),
            uploads(),
            Arc::new(SnowflakeGenerator::new(1, crate::shared::snowflake::DEFAULT_EPOCH)),
            &settings(1),
        );
        let files = vec![
            file("a.mp3", "audio/mpeg", hash(1)),
            file("b.mp3", "audio/mpeg", hash(2)),
        ];
        let err = service.analyze(files).await.unwrap_err();
        assert_eq!(
            AppError::from(err).status_code(),
            axum::http::StatusCode::BAD_REQUEST
        );
    }

    fn commit_item(title: &str, hash: String, artist_ids: Vec<i64>) -> BulkCommitItem {
        BulkCommitItem {
            filename: format!("{}.mp3", title),
            content_type: "audio/mpeg".into(),
            size: 2048,
            content_hash: hash,
            title: title.into(),
            artist_ids,
            duration_ms: None,
        }
    }

    #[tokio::test]
    async fn test_commit_suffixes_slugs_and_links_artists() {
        let mut tracks = MockTrackRepository::new();
        tracks.expect_find_by_content_hash().returning(|_| Ok(None));
        tracks.expect_find_by_slug().returning(|slug| {
            if slug == "intro" || slug == "intro-2" {
                Ok(Some(Track::new(1, "Intro".into(), slug.to_string())))
            } else {
                Ok(None)
            }
        });
        tracks
            .expect_create()
            .withf(|t| t.content_hash.is_some())
            .returning(|t| Ok(t.clone()));
        tracks
            .expect_set_artists()
            .times(1)
            .withf(|_, credits| {
                credits.len() == 1
                    && credits[0].artist_id == 100
                    && credits[0].credit == TrackCredit::Primary
            })
            .returning(|_, _| Ok(vec![]));
        let mut artists = MockArtistRepository::new();
        artists
            .expect_find_by_ids()
            .returning(|_| Ok(vec![Artist::new(100, "Daft Punk".into(), "daft-punk".into())]));

        let response = service(tracks, artists)
            .commit(vec![
                commit_item("Intro", hash(1), vec![100, 100]),
                commit_item("Outro", hash(1), vec![]),
            ])
            .await
            .unwrap();

        assert_eq!(response.created, 1);
        let first = &response.items[0];
        assert_eq!(first.status, BulkCommitStatus::Created);
        assert_eq!(first.slug.as_deref(), Some("intro-3"));
        let upload = first.upload.as_ref().unwrap();
        assert!(upload.key.starts_with("audio/"));
        assert_eq!(upload.method, "PUT");

        assert_eq!(response.items[1].status, BulkCommitStatus::Duplicate);
    }

    fn slug_conflict() -> AppError {
        AppError::Conflict("A track with this slug already exists".into())
    }

    #[tokio::test]
    async fn test_commit_keeps_created_items_when_a_later_one_fails() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut tracks = MockTrackRepository::new();
        tracks.expect_find_by_content_hash().returning(|_| Ok(None));
        tracks.expect_find_by_slug().returning(|_| Ok(None));
        let counter = calls.clone();
        tracks.expect_create().returning(move |t| {
            // Second item conflicts on both attempts
            match counter.fetch_add(1, Ordering::SeqCst) {
                1 | 2 => Err(slug_conflict()),
                _ => Ok(t.clone()),
            }
        });

        let response = service(tracks, MockArtistRepository::new())
            .commit(vec![
                commit_item("Intro", hash(1), vec![]),
                commit_item("Outro", hash(2), vec![]),
                commit_item("Coda", hash(3), vec![]),
            ])
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(response.created, 2);
        let statuses: Vec<BulkCommitStatus> = response.items.iter().map(|i| i.status).collect();
        assert_eq!(
            statuses,
            vec![
                BulkCommitStatus::Created,
                BulkCommitStatus::Failed,
                BulkCommitStatus::Created,
            ]
        );
        assert!(response.items[0].upload.is_some());
        assert!(response.items[0].track_id.is_some());
        let failed = &response.items[1];
        assert_eq!(failed.reason.as_deref(), Some("A track with this slug already exists"));
        assert!(failed.track_id.is_none());
        assert!(failed.upload.is_none());
    }

    #[tokio::test]
    async fn test_commit_retries_slug_taken_concurrently() {
        let claimed = Arc::new(AtomicBool::new(false));
        let mut tracks = MockTrackRepository::new();
        tracks.expect_find_by_content_hash().returning(|_| Ok(None));
        let seen = claimed.clone();
        tracks.expect_find_by_slug().returning(move |slug| {
            if slug == "intro" && seen.load(Ordering::SeqCst) {
                Ok(Some(Track::new(7, "Intro".into(), slug.to_string())))
            } else {
                Ok(None)
            }
        });
        let claim = claimed.clone();
        tracks.expect_create().times(2).returning(move |t| {
            if t.slug == "intro" {
                claim.store(true, Ordering::SeqCst);
                Err(slug_conflict())
            } else {
                Ok(t.clone())
            }
        });

        let response = service(tracks, MockArtistRepository::new())
            .commit(vec![commit_item("Intro", hash(1), vec![])])
            .await
            .unwrap();

        assert_eq!(response.created, 1);
        assert_eq!(response.items[0].slug.as_deref(), Some("intro-2"));
    }

    #[tokio::test]
    async fn test_commit_removes_track_when_artist_link_fails() {
        let mut tracks = MockTrackRepository::new();
        tracks.expect_find_by_content_hash().returning(|_| Ok(None));
        tracks.expect_find_by_slug().returning(|_| Ok(None));
        tracks.expect_create().returning(|t| Ok(t.clone()));
        tracks
            .expect_set_artists()
            .returning(|_, _| Err(AppError::ServiceUnavailable("pool closed".into())));
        tracks.expect_delete().times(1).returning(|_| Ok(true));
        let mut artists = MockArtistRepository::new();
        artists
            .expect_find_by_ids()
            .returning(|_| Ok(vec![Artist::new(100, "Daft Punk".into(), "daft-punk".into())]));

        let response = service(tracks, artists)
            .commit(vec![commit_item("Intro", hash(1), vec![100])])
            .await
            .unwrap();

        assert_eq!(response.created, 0);
        let item = &response.items[0];
        assert_eq!(item.status, BulkCommitStatus::Failed);
        assert_eq!(item.reason.as_deref(), Some("Could not create the track"));
    }

    #[tokio::test]
    async fn test_commit_skips_stored_duplicates_and_unknown_artists() {
        let stored = hash(9);
        let mut tracks = MockTrackRepository::new();
        tracks.expect_find_by_content_hash().returning(move |h| {
            if h == stored {
                Ok(Some(Track::new(55, "Existing".into(), "existing".into())))
            } else {
                Ok(None)
            }
        });
        tracks.expect_create().never();
        let mut artists = MockArtistRepository::new();
        artists.expect_find_by_ids().returning(|_| Ok(vec![]));

        let response = service(tracks, artists)
            .commit(vec![
                commit_item("Existing", hash(9), vec![]),
                commit_item("New", hash(2), vec![404]),
            ])
            .await
            .unwrap();

        assert_eq!(response.created, 0);
        assert_eq!(response.items[0].status, BulkCommitStatus::Duplicate);
        assert_eq!(response.items[1].status, BulkCommitStatus::Rejected);
        assert_eq!(response.items[1].reason.as_deref(), Some("Unknown artist: 404"));
    }
}
