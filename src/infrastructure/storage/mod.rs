//! Object Storage
//!
//! Media bytes never pass through this service. Browsers upload directly to
//! an S3-compatible bucket with a presigned URL, and the service only hands
//! out those URLs and the public CDN address of each object.

mod s3;

pub use s3::S3Presigner;

use std::collections::BTreeMap;
use std::time::Duration;

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Invalid storage configuration: {0}")]
    Configuration(String),

    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    #[error("Signing failed: {0}")]
    Signing(String),
}

/// A signed request the client performs itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresignedRequest {
    pub url: String,
    pub method: &'static str,
    /// Headers the client must send exactly as given
    pub headers: BTreeMap<String, String>,
    pub expires_in: u64,
}

/// Presigning and addressing for an object store.
#[cfg_attr(test, mockall::automock)]
pub trait ObjectStorage: Send + Sync {
    /// Presign a `PUT` of `key` with the given content type.
    fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<PresignedRequest, StorageError>;

    /// Public (CDN) URL of an object.
    fn public_url(&self, key: &str) -> String;
}
