//! User service
//!
//! Registration of identity rows and profile assembly. Authentication
//! itself is out of scope: callers pass an already-verified user id.

use crate::db::repositories::{is_unique_violation, RelationRepository, UserRepository};
use crate::models::{CreateUserInput, Profile, User};
use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

/// Maximum length of usernames and name fields
const MAX_NAME_LEN: usize = 150;

/// Maximum email length
const MAX_EMAIL_LEN: usize = 254;

/// Word characters plus the handful of symbols allowed in usernames
static USERNAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\w.@+-]+$").unwrap());

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// User not found
    #[error("User not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Username or email already taken
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// User service for identity rows and profiles
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    relations: Arc<dyn RelationRepository>,
}

impl UserService {
    /// Create a new user service
    pub fn new(repo: Arc<dyn UserRepository>, relations: Arc<dyn RelationRepository>) -> Self {
        Self { repo, relations }
    }

    /// Register a new user.
    ///
    /// # Errors
    /// - `ValidationError` on malformed username/email or empty names
    /// - `Conflict` when the username or email is already taken
    pub async fn register(&self, input: &CreateUserInput) -> Result<User, UserServiceError> {
        validate_registration(input)?;

        match self.repo.create(input).await {
            Ok(user) => Ok(user),
            Err(e) if is_unique_violation(&e) => Err(UserServiceError::Conflict(format!(
                "username or email already taken: {}",
                input.username
            ))),
            Err(e) => Err(UserServiceError::InternalError(
                e.context("Failed to register user"),
            )),
        }
    }

    /// Get a user by ID
    pub async fn get(&self, id: i64) -> Result<User, UserServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get user")?
            .ok_or_else(|| UserServiceError::NotFound(format!("User with ID {} not found", id)))
    }

    /// Get a user by username
    pub async fn get_by_username(&self, username: &str) -> Result<User, UserServiceError> {
        self.repo
            .get_by_username(username)
            .await
            .context("Failed to get user by username")?
            .ok_or_else(|| UserServiceError::NotFound(format!("User '{}' not found", username)))
    }

    /// Build the public profile of a user, with `is_subscribed`
    /// computed for the viewing user (false when there is no viewer).
    pub async fn profile(
        &self,
        user_id: i64,
        viewer: Option<i64>,
    ) -> Result<Profile, UserServiceError> {
        let user = self.get(user_id).await?;

        let is_subscribed = match viewer {
            Some(viewer_id) => self
                .relations
                .subscription_exists(viewer_id, user_id)
                .await
                .context("Failed to check subscription")?,
            None => false,
        };

        Ok(Profile::from_user(&user, is_subscribed))
    }
}

fn validate_registration(input: &CreateUserInput) -> Result<(), UserServiceError> {
    if input.username.is_empty() || input.username.chars().count() > MAX_NAME_LEN {
        return Err(UserServiceError::ValidationError(format!(
            "username must be between 1 and {} characters",
            MAX_NAME_LEN
        )));
    }
    if !USERNAME_RE.is_match(&input.username) {
        return Err(UserServiceError::ValidationError(
            "username may only contain letters, digits and @/./+/-/_".to_string(),
        ));
    }
    if input.email.chars().count() > MAX_EMAIL_LEN || !input.email.contains('@') {
        return Err(UserServiceError::ValidationError(format!(
            "malformed email address: {}",
            input.email
        )));
    }
    if input.first_name.trim().is_empty() || input.first_name.chars().count() > MAX_NAME_LEN {
        return Err(UserServiceError::ValidationError(
            "first name is required".to_string(),
        ));
    }
    if input.last_name.trim().is_empty() || input.last_name.chars().count() > MAX_NAME_LEN {
        return Err(UserServiceError::ValidationError(
            "last name is required".to_string(),
        ));
    }
    Ok(())
}
