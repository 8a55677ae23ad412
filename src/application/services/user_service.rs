//! User Service
//!
//! Own-profile management and admin account management.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::application::dto::request::{CreateUserRequest, UpdateProfileRequest};
use crate::application::services::auth_service::hash_password;
use crate::domain::{ListQuery, Page, User, UserRepository, UserRole};
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;
use crate::shared::validation::normalize_optional;

/// User service trait
#[async_trait]
pub trait UserService: Send + Sync {
    /// Get a user by ID
    async fn get_user(&self, user_id: i64) -> Result<User, UserError>;

    /// Update own profile
    async fn update_profile(
        &self,
        user_id: i64,
        update: UpdateProfileRequest,
    ) -> Result<User, UserError>;

    /// List accounts (admin)
    async fn list_users(&self, query: ListQuery) -> Result<Page<User>, UserError>;

    /// Create an account with a role (admin)
    async fn create_user(&self, request: CreateUserRequest) -> Result<User, UserError>;

    /// Change another account's role (admin)
    async fn update_role(
        &self,
        actor_id: i64,
        target_id: i64,
        role: UserRole,
    ) -> Result<User, UserError>;

    /// Delete another account (admin)
    async fn delete_user(&self, actor_id: i64, target_id: i64) -> Result<(), UserError>;
}

/// User service errors
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("User not found")]
    NotFound,

    #[error("Username is already taken")]
    UsernameTaken,

    #[error("Email is already registered")]
    EmailTaken,

    #[error("You cannot delete your own account")]
    CannotDeleteSelf,

    #[error("You cannot change your own role")]
    CannotChangeOwnRole,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound => AppError::NotFound(err.to_string()),
            UserError::UsernameTaken
            | UserError::EmailTaken
            | UserError::CannotDeleteSelf
            | UserError::CannotChangeOwnRole => AppError::Conflict(err.to_string()),
            UserError::Internal(msg) => AppError::Internal(msg),
            UserError::Store(inner) => inner,
        }
    }
}

/// UserService implementation
pub struct UserServiceImpl<U: UserRepository> {
    user_repo: Arc<U>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<U: UserRepository> UserServiceImpl<U> {
    pub fn new(user_repo: Arc<U>, id_generator: Arc<SnowflakeGenerator>) -> Self {
        Self {
            user_repo,
            id_generator,
        }
    }
}

#[async_trait]
impl<U: UserRepository + 'static> UserService for UserServiceImpl<U> {
    async fn get_user(&self, user_id: i64) -> Result<User, UserError> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(UserError::NotFound)
    }

    async fn update_profile(
        &self,
        user_id: i64,
        update: UpdateProfileRequest,
    ) -> Result<User, UserError> {
        let mut user = self.get_user(user_id).await?;

        if let Some(username) = update.username {
            let username = username.trim().to_string();
            if username != user.username {
                if self.user_repo.username_exists(&username).await? {
                    return Err(UserError::UsernameTaken);
                }
                user.username = username;
            }
        }
        if let Some(display_name) = normalize_optional(update.display_name) {
            user.display_name = display_name;
        }
        if let Some(bio) = normalize_optional(update.bio) {
            user.bio = bio;
        }
        if let Some(avatar_url) = normalize_optional(update.avatar_url) {
            user.avatar_url = avatar_url;
        }
        user.updated_at = Utc::now();

        let user = self.user_repo.update(&user).await?;
        tracing::info!(user_id, "Profile updated");
        Ok(user)
    }

    async fn list_users(&self, query: ListQuery) -> Result<Page<User>, UserError> {
        let (users, total) = self.user_repo.list(&query).await?;
        Ok(Page::new(users, total, &query))
    }

    async fn create_user(&self, request: CreateUserRequest) -> Result<User, UserError> {
        let email = request.email.trim().to_lowercase();
        let username = request.username.trim().to_string();

        if self.user_repo.email_exists(&email).await? {
            return Err(UserError::EmailTaken);
        }
        if self.user_repo.username_exists(&username).await? {
            return Err(UserError::UsernameTaken);
        }

        let password_hash =
            hash_password(&request.password).map_err(|e| UserError::Internal(e.to_string()))?;

        let now = Utc::now();
        let user = User {
            id: self.id_generator.generate(),
            username,
            email,
            password_hash,
            display_name: normalize_optional(request.display_name).flatten(),
            bio: None,
            avatar_url: None,
            role: request.role,
            created_at: now,
            updated_at: now,
        };
        let user = self.user_repo.create(&user).await?;

        tracing::info!(user_id = user.id, role = %user.role, "User created");
        Ok(user)
    }

    async fn update_role(
        &self,
        actor_id: i64,
        target_id: i64,
        role: UserRole,
    ) -> Result<User, UserError> {
        if actor_id == target_id {
            return Err(UserError::CannotChangeOwnRole);
        }
        let user = self
            .user_repo
            .update_role(target_id, role)
            .await?
            .ok_or(UserError::NotFound)?;

        tracing::info!(actor_id, user_id = target_id, role = %role, "Role changed");
        Ok(user)
    }

    async fn delete_user(&self, actor_id: i64, target_id: i64) -> Result<(), UserError> {
        if actor_id == target_id {
            return Err(UserError::CannotDeleteSelf);
        }
        if !self.user_repo.delete(target_id).await? {
            return Err(UserError::NotFound);
        }
        tracing::info!(actor_id, user_id = target_id, "User deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MockUserRepository;
    use axum::http::StatusCode;
    use fake::faker::internet::en::SafeEmail;
    use fake::Fake;
    use mockall::predicate::eq;

    fn service(repo: MockUserRepository) -> UserServiceImpl<MockUserRepository> {
        UserServiceImpl::new(
            Arc::new(repo),
            Arc::new(SnowflakeGenerator::new(1, crate::shared::snowflake::DEFAULT_EPOCH)),
        )
    }

    fn existing_user() -> User {
        User {
            id: 5,
            username: "ada".into(),
            email: "ada@example.com".into(),
            display_name: Some("Ada".into()),
            bio: Some("Old bio".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_update_profile_clears_and_sets_fields() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .with(eq(5))
            .returning(|_| Ok(Some(existing_user())));
        repo.expect_update().returning(|u| Ok(u.clone()));

        let user = service(repo)
            .update_profile(
                5,
                UpdateProfileRequest {
                    display_name: Some("Ada L.".into()),
                    bio: Some("".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(user.display_name.as_deref(), Some("Ada L."));
        assert_eq!(user.bio, None);
        assert_eq!(user.username, "ada");
    }

    #[tokio::test]
    async fn test_update_profile_username_taken() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .returning(|_| Ok(Some(existing_user())));
        repo.expect_username_exists()
            .with(eq("grace"))
            .returning(|_| Ok(true));
        repo.expect_update().never();

        let err = service(repo)
            .update_profile(
                5,
                UpdateProfileRequest {
                    username: Some("grace".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(AppError::from(err).status_code(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_create_user_normalizes_email() {
        let email: String = SafeEmail().fake();
        let expected = email.to_lowercase();
        let mut repo = MockUserRepository::new();
        repo.expect_email_exists().returning(|_| Ok(false));
        repo.expect_username_exists().returning(|_| Ok(false));
        repo.expect_create()
            .withf(move |u| u.email == expected && u.role == UserRole::Editor)
            .returning(|u| Ok(u.clone()));

        let user = service(repo)
            .create_user(CreateUserRequest {
                username: "newbie".into(),
                email: email.to_uppercase(),
                password: "password123".into(),
                display_name: None,
                role: UserRole::Editor,
            })
            .await
            .unwrap();
        assert_ne!(user.password_hash, "password123");
    }

    #[tokio::test]
    async fn test_create_user_email_taken() {
        let mut repo = MockUserRepository::new();
        repo.expect_email_exists().returning(|_| Ok(true));
        repo.expect_create().never();

        let err = service(repo)
            .create_user(CreateUserRequest {
                username: "dup".into(),
                email: "dup@example.com".into(),
                password: "password123".into(),
                display_name: None,
                role: UserRole::Viewer,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::EmailTaken));
    }

    #[tokio::test]
    async fn test_cannot_delete_self() {
        let mut repo = MockUserRepository::new();
        repo.expect_delete().never();

        let err = service(repo).delete_user(5, 5).await.unwrap_err();
        assert_eq!(AppError::from(err).status_code(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_delete_missing_user() {
        let mut repo = MockUserRepository::new();
        repo.expect_delete().with(eq(9)).returning(|_| Ok(false));

        let err = service(repo).delete_user(5, 9).await.unwrap_err();
        assert!(matches!(err, UserError::NotFound));
    }

    #[tokio::test]
    async fn test_store_errors_pass_through() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .returning(|_| Err(AppError::Database(sqlx::Error::PoolTimedOut)));

        let err = service(repo).get_user(1).await.unwrap_err();
        assert_eq!(
            AppError::from(err).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
