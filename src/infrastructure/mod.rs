//! Infrastructure Layer
//!
//! Contains implementations for external services including:
//! - Database repositories (PostgreSQL)
//! - Object storage presigning (S3-compatible)
//! - Prometheus metrics

pub mod database;
pub mod metrics;
pub mod repositories;
pub mod storage;
