//! Repository Implementations
//!
//! PostgreSQL implementations of domain repository traits.
//!
//! This module provides concrete implementations of the repository traits
//! defined in the domain layer. Each repository handles data access for
//! a specific entity type.
//!
//! ## Available Repositories
//!
//! - **PgUserRepository** - User accounts and profiles
//! - **PgSessionRepository** - Login sessions
//! - **PgArtistRepository** - Artists
//! - **PgGroupRepository** - Groups and their members
//! - **PgTrackRepository** - Tracks, credits and audio registration
//! - **PgReleaseRepository** - Releases, tracklists and credits
//! - **PgBannerRepository** - Notification banners
//! - **PgImageRepository** - Ordered image galleries
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use sqlx::PgPool;
//! use crate::infrastructure::repositories::{PgArtistRepository, PgTrackRepository};
//!
//! async fn setup_repositories(pool: PgPool) {
//!     let artist_repo = PgArtistRepository::new(pool.clone());
//!     let track_repo = PgTrackRepository::new(pool.clone());
//! }
//! ```

pub mod artist_repository;
pub mod banner_repository;
pub mod group_repository;
pub mod image_repository;
pub mod release_repository;
pub mod session_repository;
pub mod track_repository;
pub mod user_repository;

pub use artist_repository::PgArtistRepository;
pub use banner_repository::PgBannerRepository;
pub use group_repository::PgGroupRepository;
pub use image_repository::PgImageRepository;
pub use release_repository::PgReleaseRepository;
pub use session_repository::PgSessionRepository;
pub use track_repository::PgTrackRepository;
pub use user_repository::PgUserRepository;
