//! Upload Service
//!
//! Issues presigned direct-upload URLs. Also owns the media policy (MIME
//! allow-list and size limits) that registration calls re-check.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::application::dto::request::PresignUploadRequest;
use crate::application::dto::PresignedUploadResponse;
use crate::config::UploadSettings;
use crate::domain::MediaKind;
use crate::infrastructure::metrics;
use crate::infrastructure::storage::{ObjectStorage, StorageError};
use crate::shared::error::AppError;

/// Size limits per media kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_image_bytes: i64,
    pub max_audio_bytes: i64,
}

impl UploadLimits {
    pub fn from_settings(settings: &UploadSettings) -> Self {
        Self {
            max_image_bytes: settings.max_image_bytes,
            max_audio_bytes: settings.max_audio_bytes,
        }
    }

    pub fn max_bytes(&self, kind: MediaKind) -> i64 {
        match kind {
            MediaKind::Image => self.max_image_bytes,
            MediaKind::Audio => self.max_audio_bytes,
        }
    }

    /// Check type and size; returns the file extension for the type.
    pub fn check(
        &self,
        kind: MediaKind,
        content_type: &str,
        size: i64,
    ) -> Result<&'static str, UploadError> {
        let extension = kind
            .extension_for(content_type)
            .ok_or_else(|| UploadError::UnsupportedType {
                kind,
                content_type: content_type.to_string(),
            })?;

        let max = self.max_bytes(kind);
        if size < 1 {
            return Err(UploadError::EmptyFile);
        }
        if size > max {
            return Err(UploadError::TooLarge { kind, max });
        }
        Ok(extension)
    }
}

/// Upload errors
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Unsupported {kind} type: {content_type}")]
    UnsupportedType {
        kind: MediaKind,
        content_type: String,
    },

    #[error("File is empty")]
    EmptyFile,

    #[error("File exceeds the {kind} size limit of {max} bytes")]
    TooLarge { kind: MediaKind, max: i64 },

    #[error("Key was not issued for {0} uploads")]
    ForeignKey(MediaKind),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Storage(StorageError::InvalidKey(msg)) => AppError::BadRequest(msg),
            UploadError::Storage(e) => AppError::Internal(e.to_string()),
            other => AppError::BadRequest(other.to_string()),
        }
    }
}

/// Storage key for a new upload: `{prefix}/{yyyy}/{mm}/{uuid}.{ext}`
pub fn object_key(kind: MediaKind, extension: &str, now: DateTime<Utc>) -> String {
    format!(
        "{}/{}/{}.{}",
        kind.key_prefix(),
        now.format("%Y/%m"),
        Uuid::new_v4(),
        extension
    )
}

/// Upload service trait
pub trait UploadService: Send + Sync {
    /// Validate an upload request and presign a PUT for a fresh key
    fn presign(&self, request: &PresignUploadRequest)
        -> Result<PresignedUploadResponse, UploadError>;

    /// Reject keys that were not issued for `kind`
    fn check_key(&self, kind: MediaKind, key: &str) -> Result<(), UploadError>;

    fn limits(&self) -> UploadLimits;

    /// CDN URL of a stored object
    fn public_url(&self, key: &str) -> String;
}

/// UploadService implementation
pub struct UploadServiceImpl {
    storage: Arc<dyn ObjectStorage>,
    limits: UploadLimits,
    expires_in: Duration,
}

impl UploadServiceImpl {
    pub fn new(storage: Arc<dyn ObjectStorage>, limits: UploadLimits, expiry_secs: u64) -> Self {
        Self {
            storage,
            limits,
            expires_in: Duration::from_secs(expiry_secs),
        }
    }
}

impl UploadService for UploadServiceImpl {
    fn presign(
        &self,
        request: &PresignUploadRequest,
    ) -> Result<PresignedUploadResponse, UploadError> {
        let extension = self
            .limits
            .check(request.kind, &request.content_type, request.size)?;
        let key = object_key(request.kind, extension, Utc::now());
        let content_type = crate::domain::mime_essence(&request.content_type);

        let signed = self
            .storage
            .presign_put(&key, &content_type, self.expires_in)?;
        let cdn_url = self.storage.public_url(&key);

        metrics::record_presigned_upload(request.kind.as_str());
        tracing::debug!(kind = %request.kind, key = %key, size = request.size, "Presigned upload issued");

        Ok(PresignedUploadResponse::new(key, cdn_url, signed))
    }

    fn check_key(&self, kind: MediaKind, key: &str) -> Result<(), UploadError> {
        if kind.owns_key(key) {
            Ok(())
        } else {
            Err(UploadError::ForeignKey(kind))
        }
    }

    fn limits(&self) -> UploadLimits {
        self.limits
    }

    fn public_url(&self, key: &str) -> String {
        self.storage.public_url(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::{MockObjectStorage, PresignedRequest};
    use axum::http::StatusCode;
    use chrono::TimeZone;
    use std::collections::BTreeMap;
    use test_case::test_case;

    const LIMITS: UploadLimits = UploadLimits {
        max_image_bytes: 10 * 1024 * 1024,
        max_audio_bytes: 500 * 1024 * 1024,
    };

    fn request(kind: MediaKind, content_type: &str, size: i64) -> PresignUploadRequest {
        PresignUploadRequest {
            kind,
            filename: "file".into(),
            content_type: content_type.into(),
            size,
        }
    }

    fn storage() -> MockObjectStorage {
        let mut storage = MockObjectStorage::new();
        storage
            .expect_presign_put()
            .returning(|key, content_type, expires_in| {
                let mut headers = BTreeMap::new();
                headers.insert("content-type".to_string(), content_type.to_string());
                Ok(PresignedRequest {
                    url: format!("https://bucket.s3.example.com/{}?X-Amz-Signature=abc", key),
                    method: "PUT",
                    headers,
                    expires_in: expires_in.as_secs(),
                })
            });
        storage
            .expect_public_url()
            .returning(|key| format!("https://cdn.example.com/{}", key));
        storage
    }

    #[test_case(MediaKind::Image, "image/png", 1024, Ok("png") ; "png image")]
    #[test_case(MediaKind::Audio, "audio/flac", 1024, Ok("flac") ; "flac audio")]
    #[test_case(MediaKind::Image, "audio/mpeg", 1024, Err(()) ; "audio as image")]
    #[test_case(MediaKind::Image, "image/png", 0, Err(()) ; "empty")]
    #[test_case(MediaKind::Image, "image/png", 10 * 1024 * 1024 + 1, Err(()) ; "image too large")]
    #[test_case(MediaKind::Audio, "audio/mpeg", 500 * 1024 * 1024, Ok("mp3") ; "audio at limit")]
    fn test_limits_check(
        kind: MediaKind,
        content_type: &str,
        size: i64,
        expected: Result<&'static str, ()>,
    ) {
        assert_eq!(
            LIMITS.check(kind, content_type, size).map_err(|_| ()),
            expected
        );
    }

    #[test]
    fn test_object_key_layout() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
        let key = object_key(MediaKind::Audio, "mp3", now);
        assert!(key.starts_with("audio/2024/03/"));
        assert!(key.ends_with(".mp3"));
        let id = &key["audio/2024/03/".len()..key.len() - ".mp3".len()];
        assert!(Uuid::parse_str(id).is_ok());
    }

    #[test]
    fn test_presign_issues_fresh_key() {
        let service = UploadServiceImpl::new(Arc::new(storage()), LIMITS, 900);
        let response = service
            .presign(&request(MediaKind::Image, "image/jpeg; charset=binary", 2048))
            .unwrap();

        assert_eq!(response.method, "PUT");
        assert!(response.key.starts_with("images/"));
        assert!(response.key.ends_with(".jpg"));
        assert_eq!(
            response.cdn_url,
            format!("https://cdn.example.com/{}", response.key)
        );
        assert_eq!(response.expires_in, 900);
        assert_eq!(response.headers["content-type"], "image/jpeg");
    }

    #[test]
    fn test_presign_rejects_unsupported_type() {
        let mut storage = MockObjectStorage::new();
        storage.expect_presign_put().never();
        let service = UploadServiceImpl::new(Arc::new(storage), LIMITS, 900);

        let err = service
            .presign(&request(MediaKind::Audio, "video/mp4", 10))
            .unwrap_err();
        assert_eq!(err.to_string(), "Unsupported audio type: video/mp4");
        assert_eq!(AppError::from(err).status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_check_key() {
        let service = UploadServiceImpl::new(Arc::new(MockObjectStorage::new()), LIMITS, 900);
        assert!(service.check_key(MediaKind::Audio, "audio/2024/01/x.mp3").is_ok());
        assert!(service.check_key(MediaKind::Image, "audio/2024/01/x.mp3").is_err());
        assert!(service.check_key(MediaKind::Image, "images/../secret").is_err());
    }
}
