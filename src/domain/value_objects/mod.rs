//! # Domain Value Objects
//!
//! Immutable value types that represent domain concepts without identity.
//!
//! ## Value Objects
//!
//! - **Slug**: URL-safe unique identifier derived from a display name
//! - **ContentHash**: SHA-256 digest used for duplicate upload detection
//! - **MediaKind**: Image/audio upload category with its MIME allow-list
//! - **UserRole**: Ordered access level of an account
//! - **ListQuery / Page**: Search and offset pagination

mod content_hash;
mod media;
mod pagination;
mod role;
mod slug;

pub use content_hash::*;
pub use media::*;
pub use pagination::*;
pub use role::*;
pub use slug::*;
