//! Login session entity and repository trait.
//!
//! Maps to the `sessions` table in the database schema. The raw session
//! token only ever exists in the client's cookie; the database keeps its
//! SHA-256 hash.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Represents an authenticated browser or API session.
///
/// Maps to the `sessions` table:
/// - id: UUID PRIMARY KEY
/// - user_id: BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE
/// - token_hash: CHAR(64) NOT NULL UNIQUE (SHA-256 hex)
/// - user_agent: TEXT NULL
/// - ip_address: VARCHAR(45) NULL
/// - expires_at: TIMESTAMPTZ NOT NULL
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// - last_seen_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// - revoked_at: TIMESTAMPTZ NULL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,

    pub user_id: i64,

    /// SHA-256 hash of the session token (never store raw tokens)
    #[serde(skip_serializing)]
    pub token_hash: String,

    pub user_agent: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,

    pub expires_at: DateTime<Utc>,

    pub created_at: DateTime<Utc>,

    /// Last request made with this session
    pub last_seen_at: DateTime<Utc>,

    /// When the session was revoked (None if active)
    pub revoked_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Create a new session valid for `ttl`.
    pub fn new(user_id: i64, token_hash: String, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            token_hash,
            user_agent: None,
            ip_address: None,
            expires_at: now + ttl,
            created_at: now,
            last_seen_at: now,
            revoked_at: None,
        }
    }

    /// Check if the session is currently active (not expired, not revoked).
    pub fn is_active(&self) -> bool {
        self.is_active_at(Utc::now())
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }
}

/// Repository trait for Session data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Find a session by token hash, regardless of state.
    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>, AppError>;

    async fn create(&self, session: &Session) -> Result<Session, AppError>;

    /// Update `last_seen_at` to now.
    async fn touch(&self, id: Uuid) -> Result<(), AppError>;

    /// Revoke a single session. Revoking twice is a no-op.
    async fn revoke(&self, id: Uuid) -> Result<(), AppError>;

    /// Revoke every active session of a user, optionally keeping one.
    async fn revoke_all_for_user(&self, user_id: i64, except: Option<Uuid>) -> Result<u64, AppError>;

    /// Delete expired and revoked sessions. Returns the number removed.
    async fn delete_expired(&self) -> Result<u64, AppError>;
}
