//! Data Transfer Objects
//!
//! DTOs for API request/response serialization.

pub mod request;
pub mod response;
pub mod upload;

pub use upload::{
    BulkAnalysisResponse, BulkCommitResponse, BulkCommitResult, BulkCommitStatus,
    BulkItemReport, BulkItemStatus, BulkSummary, PresignedUploadResponse,
};
