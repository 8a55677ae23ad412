//! HTTP Handlers
//!
//! Request handlers for all HTTP endpoints.

pub mod artists;
pub mod auth;
pub mod banners;
pub mod groups;
pub mod health;
pub mod images;
pub mod profile;
pub mod releases;
pub mod tracks;
pub mod uploads;
pub mod users;
