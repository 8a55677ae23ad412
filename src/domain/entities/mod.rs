//! # Domain Entities
//!
//! Core domain entities of the catalog. All entities map directly to their
//! corresponding database tables.
//!
//! ## Catalog
//!
//! - **Artist**: A performing artist
//! - **Group**: A band made of artists
//! - **Track**: A recording, with its audio upload state
//! - **Release**: An album, single, EP or compilation with a tracklist
//! - **Image**: Ordered images attached to catalog records and profiles
//! - **NotificationBanner**: Site-wide messages with a display window
//!
//! ## Accounts
//!
//! - **User**: Account with credentials, profile and role
//! - **Session**: Login session tracked by token hash
//!
//! ## Repository Traits
//!
//! Each entity has an associated repository trait defining data access operations.
//! These traits are implemented in the infrastructure layer, following the
//! dependency inversion principle.

mod artist;
mod banner;
mod group;
mod image;
mod release;
mod session;
mod track;
mod user;

pub use artist::{Artist, ArtistRepository, ArtistSummary};
pub use banner::{BannerRepository, BannerVariant, NotificationBanner};
pub use group::{Group, GroupMember, GroupRepository, NewGroupMember};
pub use image::{Image, ImageOwner, ImageRepository};
pub use release::{NewReleaseTrack, Release, ReleaseRepository, ReleaseTrack, ReleaseType};
pub use session::{Session, SessionRepository};
pub use track::{
    AudioStatus, NewTrackArtist, Track, TrackArtist, TrackAudio, TrackCredit, TrackRepository,
};
pub use user::{User, UserRepository};

#[cfg(test)]
pub use artist::MockArtistRepository;
#[cfg(test)]
pub use banner::MockBannerRepository;
#[cfg(test)]
pub use group::MockGroupRepository;
#[cfg(test)]
pub use image::MockImageRepository;
#[cfg(test)]
pub use release::MockReleaseRepository;
#[cfg(test)]
pub use session::MockSessionRepository;
#[cfg(test)]
pub use track::MockTrackRepository;
#[cfg(test)]
pub use user::MockUserRepository;
