//! User relationship models
//!
//! Favorites, shopping cart entries and author subscriptions. Each is a
//! first-class row with a storage-level uniqueness constraint; toggling
//! is expressed through `ToggleAction`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::recipe::RecipeSummary;
use crate::models::user::Profile;

/// A user's bookmark of a recipe.
///
/// `recipe_id` is `None` once the recipe has been deleted: the row is
/// kept as history instead of cascading away.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Favorite {
    /// Unique identifier
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    /// Bookmarked recipe, None after the recipe was deleted
    pub recipe_id: Option<i64>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// A recipe queued for shopping-list aggregation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShoppingCartEntry {
    /// Unique identifier
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    /// Queued recipe
    pub recipe_id: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// A follower relationship between two users.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subscription {
    /// Unique identifier
    pub id: i64,
    /// Follower
    pub user_id: i64,
    /// Followed author
    pub author_id: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Direction of a toggle operation on favorites, the cart or
/// subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleAction {
    /// Create the relationship
    Add,
    /// Delete the relationship
    Remove,
}

/// One author in a subscription listing: profile fields plus the
/// author's recipes and total recipe count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionEntry {
    /// Author profile; `is_subscribed` is always true in this context
    #[serde(flatten)]
    pub author: Profile,
    /// The author's recipes, optionally truncated
    pub recipes: Vec<RecipeSummary>,
    /// Total number of recipes by this author (before truncation)
    pub recipes_count: i64,
}
