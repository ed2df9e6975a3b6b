//! Data models
//!
//! Entities and the read/write shapes surfaced to the embedding API
//! layer. Write inputs and read representations are separate structs
//! with explicit mapping, never one struct with switched field sets.

pub mod ingredient;
pub mod recipe;
pub mod relation;
pub mod shopping_list;
pub mod tag;
pub mod user;

pub use ingredient::{CatalogEntry, Ingredient};
pub use recipe::{
    IngredientLine, Recipe, RecipeDetail, RecipeFilter, RecipeIngredientDetail, RecipeInput,
    RecipeSummary,
};
pub use relation::{Favorite, ShoppingCartEntry, Subscription, SubscriptionEntry, ToggleAction};
pub use shopping_list::{ShoppingList, ShoppingListItem};
pub use tag::{CreateTagInput, Tag};
pub use user::{CreateUserInput, Profile, User};
