//! Shared Utilities
//!
//! Common utilities used across all layers.

pub mod error;
pub mod serde_ids;
pub mod snowflake;
pub mod validation;
