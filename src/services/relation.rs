//! User relationship service
//!
//! Favorites, shopping cart and subscription toggles, plus the
//! subscription listing with per-author recipes and counts.
//!
//! The add/remove contracts are asymmetric on purpose:
//! - favorite/cart remove-when-absent is a `NotFound`
//! - subscription remove-when-absent is a `ValidationError`, the same
//!   class as self-subscription

use crate::db::repositories::{
    is_unique_violation, RecipeRepository, RelationRepository, UserRepository,
};
use crate::models::{
    Profile, RecipeSummary, SubscriptionEntry, ToggleAction,
};
use anyhow::Context;
use std::sync::Arc;

/// Error types for relationship operations
#[derive(Debug, thiserror::Error)]
pub enum RelationServiceError {
    /// Recipe/user absent, or favorite/cart remove-when-absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Self-subscription, or unsubscribe-when-not-subscribed
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The relationship already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// User relationship service
pub struct RelationService {
    relations: Arc<dyn RelationRepository>,
    recipes: Arc<dyn RecipeRepository>,
    users: Arc<dyn UserRepository>,
}

impl RelationService {
    /// Create a new relation service
    pub fn new(
        relations: Arc<dyn RelationRepository>,
        recipes: Arc<dyn RecipeRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            relations,
            recipes,
            users,
        }
    }

    /// Add or remove a favorite.
    ///
    /// Add returns a compact summary of the favorited recipe; remove
    /// returns None.
    ///
    /// # Errors
    /// - `NotFound` when the recipe is absent, or on remove-when-absent
    /// - `Conflict` on add-when-present
    pub async fn toggle_favorite(
        &self,
        user_id: i64,
        recipe_id: i64,
        action: ToggleAction,
    ) -> Result<Option<RecipeSummary>, RelationServiceError> {
        let recipe = self
            .recipes
            .get_by_id(recipe_id)
            .await
            .context("Failed to get recipe")?
            .ok_or_else(|| {
                RelationServiceError::NotFound(format!("Recipe with ID {} not found", recipe_id))
            })?;

        match action {
            ToggleAction::Add => {
                if self
                    .relations
                    .favorite_exists(user_id, recipe_id)
                    .await
                    .context("Failed to check favorite")?
                {
                    return Err(RelationServiceError::Conflict(
                        "recipe is already in favorites".to_string(),
                    ));
                }
                match self.relations.favorite_add(user_id, recipe_id).await {
                    Ok(_) => Ok(Some(RecipeSummary::from(&recipe))),
                    // A concurrent add can beat the pre-check to the
                    // unique index; same answer either way.
                    Err(e) if is_unique_violation(&e) => Err(RelationServiceError::Conflict(
                        "recipe is already in favorites".to_string(),
                    )),
                    Err(e) => Err(RelationServiceError::InternalError(
                        e.context("Failed to add favorite"),
                    )),
                }
            }
            ToggleAction::Remove => {
                let removed = self
                    .relations
                    .favorite_remove(user_id, recipe_id)
                    .await
                    .context("Failed to remove favorite")?;
                if !removed {
                    return Err(RelationServiceError::NotFound(
                        "recipe is not in favorites".to_string(),
                    ));
                }
                Ok(None)
            }
        }
    }

    /// Add or remove a shopping cart entry; same contract as
    /// [`toggle_favorite`](Self::toggle_favorite).
    pub async fn toggle_shopping_cart(
        &self,
        user_id: i64,
        recipe_id: i64,
        action: ToggleAction,
    ) -> Result<Option<RecipeSummary>, RelationServiceError> {
        let recipe = self
            .recipes
            .get_by_id(recipe_id)
            .await
            .context("Failed to get recipe")?
            .ok_or_else(|| {
                RelationServiceError::NotFound(format!("Recipe with ID {} not found", recipe_id))
            })?;

        match action {
            ToggleAction::Add => {
                if self
                    .relations
                    .cart_exists(user_id, recipe_id)
                    .await
                    .context("Failed to check shopping cart")?
                {
                    return Err(RelationServiceError::Conflict(
                        "recipe is already in the shopping cart".to_string(),
                    ));
                }
                match self.relations.cart_add(user_id, recipe_id).await {
                    Ok(_) => Ok(Some(RecipeSummary::from(&recipe))),
                    Err(e) if is_unique_violation(&e) => Err(RelationServiceError::Conflict(
                        "recipe is already in the shopping cart".to_string(),
                    )),
                    Err(e) => Err(RelationServiceError::InternalError(
                        e.context("Failed to add shopping cart entry"),
                    )),
                }
            }
            ToggleAction::Remove => {
                let removed = self
                    .relations
                    .cart_remove(user_id, recipe_id)
                    .await
                    .context("Failed to remove shopping cart entry")?;
                if !removed {
                    return Err(RelationServiceError::NotFound(
                        "recipe is not in the shopping cart".to_string(),
                    ));
                }
                Ok(None)
            }
        }
    }

    /// Subscribe to or unsubscribe from an author.
    ///
    /// Subscribing to yourself is rejected regardless of action or
    /// prior state. Add returns the new subscription listing entry for
    /// the author; remove returns None.
    pub async fn toggle_subscription(
        &self,
        user_id: i64,
        author_id: i64,
        action: ToggleAction,
        recipe_limit: Option<i64>,
    ) -> Result<Option<SubscriptionEntry>, RelationServiceError> {
        if user_id == author_id {
            return Err(RelationServiceError::ValidationError(
                "you cannot subscribe to yourself (or unsubscribe)".to_string(),
            ));
        }

        let author = self
            .users
            .get_by_id(author_id)
            .await
            .context("Failed to get author")?
            .ok_or_else(|| {
                RelationServiceError::NotFound(format!("User with ID {} not found", author_id))
            })?;

        match action {
            ToggleAction::Add => {
                if self
                    .relations
                    .subscription_exists(user_id, author_id)
                    .await
                    .context("Failed to check subscription")?
                {
                    return Err(RelationServiceError::Conflict(format!(
                        "already subscribed to {}",
                        author.username
                    )));
                }
                match self.relations.subscription_add(user_id, author_id).await {
                    Ok(_) => {}
                    Err(e) if is_unique_violation(&e) => {
                        return Err(RelationServiceError::Conflict(format!(
                            "already subscribed to {}",
                            author.username
                        )));
                    }
                    Err(e) => {
                        return Err(RelationServiceError::InternalError(
                            e.context("Failed to add subscription"),
                        ));
                    }
                }

                let entry = self
                    .subscription_entry(Profile::from_user(&author, true), recipe_limit)
                    .await?;
                Ok(Some(entry))
            }
            ToggleAction::Remove => {
                let removed = self
                    .relations
                    .subscription_remove(user_id, author_id)
                    .await
                    .context("Failed to remove subscription")?;
                if !removed {
                    return Err(RelationServiceError::ValidationError(format!(
                        "not subscribed to {}",
                        author.username
                    )));
                }
                Ok(None)
            }
        }
    }

    /// List the authors a user follows, each with profile fields, the
    /// author's recipes (truncated to `recipe_limit` in the store's
    /// default newest-first order) and the total recipe count.
    pub async fn list_subscriptions(
        &self,
        user_id: i64,
        recipe_limit: Option<i64>,
    ) -> Result<Vec<SubscriptionEntry>, RelationServiceError> {
        let authors = self
            .relations
            .list_subscribed_authors(user_id)
            .await
            .context("Failed to list subscribed authors")?;

        let mut entries = Vec::with_capacity(authors.len());
        for author in authors {
            let entry = self
                .subscription_entry(Profile::from_user(&author, true), recipe_limit)
                .await?;
            entries.push(entry);
        }

        Ok(entries)
    }

    async fn subscription_entry(
        &self,
        author: Profile,
        recipe_limit: Option<i64>,
    ) -> Result<SubscriptionEntry, RelationServiceError> {
        let recipes = self
            .recipes
            .list_by_author(author.id, recipe_limit)
            .await
            .context("Failed to list author recipes")?;
        let recipes_count = self
            .recipes
            .count_by_author(author.id)
            .await
            .context("Failed to count author recipes")?;

        Ok(SubscriptionEntry {
            author,
            recipes: recipes.iter().map(RecipeSummary::from).collect(),
            recipes_count,
        })
    }
}
