//! Recipe model
//!
//! This module provides:
//! - `Recipe` entity and its quantified ingredient links
//! - `RecipeInput` write shape (used for both create and full update)
//! - `RecipeDetail` read shape assembled for the API layer
//! - `RecipeFilter` for list queries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::tag::Tag;
use crate::models::user::Profile;

/// Recipe entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipe {
    /// Unique identifier
    pub id: i64,
    /// Author user ID
    pub author_id: i64,
    /// Recipe name
    pub name: String,
    /// Opaque image reference resolved by external blob storage
    pub image: Option<String>,
    /// Free-form cooking instructions
    pub text: String,
    /// Cooking time in minutes (at least 1)
    pub cooking_time: i32,
    /// Creation timestamp; lists are ordered newest first
    pub created_at: DateTime<Utc>,
}

/// One quantified ingredient reference in a recipe write request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct IngredientLine {
    /// Catalog ingredient ID
    pub ingredient_id: i64,
    /// Amount in the ingredient's measurement unit, 1..=1000
    pub amount: i32,
}

/// Write shape for creating or fully replacing a recipe.
///
/// Updates use clear-then-rewrite semantics: the ingredient list and
/// tag set given here become the recipe's entire list and set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeInput {
    /// Recipe name
    pub name: String,
    /// Cooking instructions
    pub text: String,
    /// Cooking time in minutes
    pub cooking_time: i32,
    /// Optional image reference
    pub image: Option<String>,
    /// Quantified ingredient list (must be non-empty, no duplicates)
    pub ingredients: Vec<IngredientLine>,
    /// Tag IDs (must be non-empty, no duplicates)
    pub tag_ids: Vec<i64>,
}

/// Ingredient line in the read representation: catalog fields joined
/// with the per-recipe amount.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeIngredientDetail {
    /// Catalog ingredient ID
    pub id: i64,
    /// Ingredient name
    pub name: String,
    /// Measurement unit
    pub measurement_unit: String,
    /// Amount in this recipe
    pub amount: i32,
}

/// Full read shape of a recipe, as surfaced to the API layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeDetail {
    /// Recipe ID
    pub id: i64,
    /// Attached tags
    pub tags: Vec<Tag>,
    /// Author profile (with `is_subscribed` relative to the viewer)
    pub author: Profile,
    /// Quantified ingredients
    pub ingredients: Vec<RecipeIngredientDetail>,
    /// Whether the viewer has favorited this recipe
    pub is_favorited: bool,
    /// Whether this recipe is in the viewer's shopping cart
    pub is_in_shopping_cart: bool,
    /// Recipe name
    pub name: String,
    /// Image reference
    pub image: Option<String>,
    /// Cooking instructions
    pub text: String,
    /// Cooking time in minutes
    pub cooking_time: i32,
}

/// Compact recipe representation used in favorites, cart responses and
/// subscription listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeSummary {
    /// Recipe ID
    pub id: i64,
    /// Recipe name
    pub name: String,
    /// Image reference
    pub image: Option<String>,
    /// Cooking time in minutes
    pub cooking_time: i32,
}

impl From<&Recipe> for RecipeSummary {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name.clone(),
            image: recipe.image.clone(),
            cooking_time: recipe.cooking_time,
        }
    }
}

/// Filter for recipe list queries.
///
/// All set criteria are combined with AND; the tag slugs within
/// `tag_slugs` are OR'd (any matching tag qualifies the recipe).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipeFilter {
    /// Only recipes by this author
    pub author_id: Option<i64>,
    /// Only recipes carrying at least one of these tag slugs
    pub tag_slugs: Vec<String>,
    /// Only recipes favorited by this user
    pub favorited_by: Option<i64>,
    /// Only recipes in this user's shopping cart
    pub in_shopping_cart_of: Option<i64>,
}

impl RecipeFilter {
    /// Create an empty filter (matches every recipe)
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to an author
    pub fn with_author(mut self, author_id: i64) -> Self {
        self.author_id = Some(author_id);
        self
    }

    /// Restrict to recipes carrying any of the given tag slugs
    pub fn with_tag_slugs(mut self, slugs: Vec<String>) -> Self {
        self.tag_slugs = slugs;
        self
    }

    /// Restrict to recipes favorited by the given user
    pub fn with_favorited_by(mut self, user_id: i64) -> Self {
        self.favorited_by = Some(user_id);
        self
    }

    /// Restrict to recipes in the given user's shopping cart
    pub fn with_in_shopping_cart_of(mut self, user_id: i64) -> Self {
        self.in_shopping_cart_of = Some(user_id);
        self
    }

    /// Check if any criterion is set
    pub fn is_empty(&self) -> bool {
        self.author_id.is_none()
            && self.tag_slugs.is_empty()
            && self.favorited_by.is_none()
            && self.in_shopping_cart_of.is_none()
    }
}
