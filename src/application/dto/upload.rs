//! Upload DTOs
//!
//! Presigned upload responses and the bulk track upload reports.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::TrackMetadata;
use crate::infrastructure::storage::PresignedRequest;

/// A presigned direct upload the browser performs itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresignedUploadResponse {
    pub upload_url: String,
    pub method: &'static str,
    pub key: String,
    pub cdn_url: String,
    pub expires_in: u64,
    pub headers: BTreeMap<String, String>,
}

impl PresignedUploadResponse {
    pub fn new(key: String, cdn_url: String, request: PresignedRequest) -> Self {
        Self {
            upload_url: request.url,
            method: request.method,
            key,
            cdn_url,
            expires_in: request.expires_in,
            headers: request.headers,
        }
    }
}

/// Outcome of analyzing one file of a bulk upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkItemStatus {
    Ready,
    Rejected,
    /// Same content as a stored track
    Duplicate,
    /// Same content as an earlier file of the batch
    DuplicateInBatch,
}

impl BulkItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Rejected => "rejected",
            Self::Duplicate => "duplicate",
            Self::DuplicateInBatch => "duplicate_in_batch",
        }
    }
}

/// Analysis of one file, in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkItemReport {
    pub index: usize,
    pub filename: String,
    pub status: BulkItemStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Normalized content hash, when it parsed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_of_track: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_of_index: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<TrackMetadata>,

    /// Existing artists matched by slug
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub artist_ids: Vec<String>,

    /// Artist names with no matching record
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unresolved_artists: Vec<String>,
}

impl BulkItemReport {
    pub fn new(index: usize, filename: String, status: BulkItemStatus) -> Self {
        Self {
            index,
            filename,
            status,
            reason: None,
            content_hash: None,
            duplicate_of_track: None,
            duplicate_of_index: None,
            metadata: None,
            artist_ids: Vec::new(),
            unresolved_artists: Vec::new(),
        }
    }

    pub fn rejected(index: usize, filename: String, reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            ..Self::new(index, filename, BulkItemStatus::Rejected)
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BulkSummary {
    pub ready: usize,
    /// Stored and in-batch duplicates
    pub duplicates: usize,
    pub rejected: usize,
}

impl BulkSummary {
    pub fn of(items: &[BulkItemReport]) -> Self {
        items.iter().fold(Self::default(), |mut summary, item| {
            match item.status {
                BulkItemStatus::Ready => summary.ready += 1,
                BulkItemStatus::Rejected => summary.rejected += 1,
                BulkItemStatus::Duplicate | BulkItemStatus::DuplicateInBatch => {
                    summary.duplicates += 1
                }
            }
            summary
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkAnalysisResponse {
    pub items: Vec<BulkItemReport>,
    pub summary: BulkSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkCommitStatus {
    Created,
    Duplicate,
    Rejected,
    /// Storing the track failed; the file can be committed again
    Failed,
}

/// Result of committing one file: a pending track and its upload URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkCommitResult {
    pub index: usize,
    pub filename: String,
    pub status: BulkCommitStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload: Option<PresignedUploadResponse>,
}

impl BulkCommitResult {
    pub fn skipped(
        index: usize,
        filename: String,
        status: BulkCommitStatus,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            index,
            filename,
            status,
            reason: Some(reason.into()),
            track_id: None,
            slug: None,
            upload: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkCommitResponse {
    pub items: Vec<BulkCommitResult>,
    pub created: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_summary_counts_both_duplicate_kinds() {
        let items = vec![
            BulkItemReport::new(0, "a.mp3".into(), BulkItemStatus::Ready),
            BulkItemReport::new(1, "b.mp3".into(), BulkItemStatus::Duplicate),
            BulkItemReport::new(2, "c.mp3".into(), BulkItemStatus::DuplicateInBatch),
            BulkItemReport::rejected(3, "d.txt".into(), "Unsupported audio type"),
        ];
        assert_eq!(
            BulkSummary::of(&items),
            BulkSummary {
                ready: 1,
                duplicates: 2,
                rejected: 1
            }
        );
    }

    #[test]
    fn test_report_serialization_omits_empty_fields() {
        let mut item = BulkItemReport::new(2, "c.mp3".into(), BulkItemStatus::DuplicateInBatch);
        item.duplicate_of_index = Some(0);
        let value = serde_json::to_value(item).unwrap();
        assert_eq!(
            value,
            json!({
                "index": 2,
                "filename": "c.mp3",
                "status": "duplicate_in_batch",
                "duplicate_of_index": 0
            })
        );
    }
}
