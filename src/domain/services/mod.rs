//! # Domain Services
//!
//! Business rules that don't belong to a single entity.
//!
//! ## Services
//!
//! - **metadata**: Track metadata extraction from upload filenames

mod metadata;

pub use metadata::*;
