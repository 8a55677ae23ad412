//! User entity and repository trait.
//!
//! Maps to the `users` table in the database schema. A user's own view of
//! this record is their profile.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{ListQuery, UserRole};
use crate::shared::error::AppError;

/// Represents a user account.
///
/// Maps to the `users` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - username: VARCHAR(32) NOT NULL UNIQUE
/// - email: VARCHAR(255) NOT NULL UNIQUE
/// - password_hash: VARCHAR(255) NOT NULL
/// - display_name: VARCHAR(64) NULL
/// - bio: TEXT NULL
/// - avatar_url: TEXT NULL
/// - role: VARCHAR(16) NOT NULL DEFAULT 'viewer'
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// - updated_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Snowflake ID (primary key)
    pub id: i64,

    /// Username (2-32 characters, unique)
    pub username: String,

    /// Email address (unique, stored lowercase)
    pub email: String,

    /// Argon2 password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub display_name: Option<String>,

    pub bio: Option<String>,

    /// URL to the user's avatar image
    pub avatar_url: Option<String>,

    #[serde(default)]
    pub role: UserRole,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Get the user's display name, falling back to username if not set.
    pub fn display_name_or_username(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }
}

impl Default for User {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            username: String::new(),
            email: String::new(),
            password_hash: String::new(),
            display_name: None,
            bio: None,
            avatar_url: None,
            role: UserRole::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Repository trait for User data access operations.
///
/// Implementations of this trait handle the actual database interactions.
/// The trait is defined in the domain layer to maintain dependency inversion.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by their Snowflake ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    /// Find a user by their email address (case-insensitive).
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Find a user by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// One page of users plus the total match count.
    async fn list(&self, query: &ListQuery) -> Result<(Vec<User>, i64), AppError>;

    /// Total number of accounts.
    async fn count(&self) -> Result<i64, AppError>;

    /// Create a new user in the database.
    async fn create(&self, user: &User) -> Result<User, AppError>;

    /// Update profile fields of an existing user.
    async fn update(&self, user: &User) -> Result<User, AppError>;

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<(), AppError>;

    async fn update_role(&self, id: i64, role: UserRole) -> Result<Option<User>, AppError>;

    /// Delete a user by ID. Returns `false` when nothing was deleted.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Check if an email address is already registered.
    async fn email_exists(&self, email: &str) -> Result<bool, AppError>;

    /// Check if a username is already taken.
    async fn username_exists(&self, username: &str) -> Result<bool, AppError>;
}
