//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **AuthService**: Login, sessions, password changes, admin bootstrap
//! - **UserService**: Profiles and user administration
//! - **ArtistService** / **GroupService**: Artists, groups and memberships
//! - **TrackService**: Tracks, credits and audio registration
//! - **ReleaseService**: Releases, tracklists and release artists
//! - **BannerService**: Site-wide notification banners
//! - **ImageService**: Images attached to catalog records and profiles
//! - **UploadService**: Presigned direct-to-storage uploads
//! - **BulkUploadService**: Multi-file track upload (analyze, then commit)

pub mod auth_service;
pub mod user_service;
pub mod catalog;
pub mod artist_service;
pub mod group_service;
pub mod track_service;
pub mod release_service;
pub mod banner_service;
pub mod image_service;
pub mod upload_service;
pub mod bulk_upload_service;

// Re-export auth service types
pub use auth_service::{
    AuthError, AuthService, AuthServiceImpl, AuthenticatedSession, BootstrapAdmin, ClientInfo,
    LoginOutcome,
};

// Re-export user service types
pub use user_service::{UserError, UserService, UserServiceImpl};

// Re-export catalog service types
pub use catalog::CatalogError;
pub use artist_service::{ArtistDetail, ArtistService, ArtistServiceImpl};
pub use group_service::{GroupDetail, GroupService, GroupServiceImpl};
pub use track_service::{TrackDetail, TrackService, TrackServiceImpl};
pub use release_service::{ReleaseDetail, ReleaseService, ReleaseServiceImpl};
pub use banner_service::{BannerService, BannerServiceImpl};
pub use image_service::{Actor, ImageService, ImageServiceImpl};

// Re-export upload service types
pub use upload_service::{UploadError, UploadLimits, UploadService, UploadServiceImpl};
pub use bulk_upload_service::{BulkUploadError, BulkUploadService, BulkUploadServiceImpl};
