//! # Domain Layer
//!
//! The domain layer contains the core business rules of the catalog.
//! It is independent of any external frameworks or infrastructure concerns.
//!
//! ## Structure
//!
//! - **entities**: Catalog and account entities with their repository traits
//! - **value_objects**: Immutable value types (Slug, ContentHash, MediaKind, etc.)
//! - **services**: Domain logic spanning entities (filename metadata)
//!
//! ## Design Principles
//!
//! - No dependencies on infrastructure or presentation layers
//! - Repository traits define data access contracts
//! - Entities encapsulate domain behavior

pub mod entities;
pub mod services;
pub mod value_objects;

// Re-export commonly used types
pub use entities::*;
pub use services::*;
pub use value_objects::*;
