//! User model
//!
//! Minimal identity rows for authorship, profiles and subscriptions.
//! Credentials never live here: authentication is handled by the
//! embedding application, which hands the core an already-verified
//! user id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Username (unique)
    pub username: String,
    /// Email address (unique)
    pub email: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with the given parameters.
    ///
    /// The ID will be set to 0 and should be assigned by the database.
    pub fn new(username: String, email: String, first_name: String, last_name: String) -> Self {
        Self {
            id: 0, // Will be set by the database
            username,
            email,
            first_name,
            last_name,
            created_at: Utc::now(),
        }
    }

    /// Full display name, "First Last"
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Public profile representation of a user.
///
/// `is_subscribed` is computed relative to a viewing user; it is false
/// when there is no viewer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    /// User ID
    pub id: i64,
    /// Username
    pub username: String,
    /// Email address
    pub email: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Whether the viewing user follows this user
    pub is_subscribed: bool,
}

impl Profile {
    /// Build a profile from a user row and a precomputed subscription flag
    pub fn from_user(user: &User, is_subscribed: bool) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_subscribed,
        }
    }
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserInput {
    /// Username
    pub username: String,
    /// Email address
    pub email: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_new() {
        let user = User::new(
            "chef".to_string(),
            "chef@example.com".to_string(),
            "Julia".to_string(),
            "Child".to_string(),
        );

        assert_eq!(user.id, 0);
        assert_eq!(user.username, "chef");
        assert_eq!(user.display_name(), "Julia Child");
    }

    #[test]
    fn test_profile_from_user() {
        let mut user = User::new(
            "chef".to_string(),
            "chef@example.com".to_string(),
            "Julia".to_string(),
            "Child".to_string(),
        );
        user.id = 7;

        let profile = Profile::from_user(&user, true);
        assert_eq!(profile.id, 7);
        assert_eq!(profile.username, "chef");
        assert!(profile.is_subscribed);
    }
}
