//! # Catalog Admin Library
//!
//! Content management backend for a music catalog:
//! - Artists, groups, tracks and releases with slugs and relations
//! - Notification banners
//! - Session authentication with viewer/editor/admin roles
//! - Presigned uploads to S3-compatible storage and bulk track import
//! - PostgreSQL for persistent storage
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Entities, value objects and repository traits
//! - **Application Layer**: Services and DTOs
//! - **Infrastructure Layer**: PostgreSQL repositories, object storage, metrics
//! - **Presentation Layer**: HTTP routes, extractors and middleware
//!
//! ## Module Structure
//!
//! ```text
//! catalog_admin/
//! +-- config/         Configuration management
//! +-- domain/         Domain entities, value objects, and traits
//! +-- application/    Application services and DTOs
//! +-- infrastructure/ Database, storage and metrics
//! +-- presentation/   HTTP routes and middleware
//! +-- shared/         Common utilities (errors, snowflake IDs, validation)
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
