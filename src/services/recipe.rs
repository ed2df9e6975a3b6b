//! Recipe service
//!
//! Business logic for recipe authoring:
//! - Create, update, delete with author-only permission checks
//! - Ingredient/tag list validation (all offending items are collected
//!   into one message before failing, so the caller sees every problem
//!   at once)
//! - Assembly of the full read representation
//!
//! Writes delegate to the repository, which wraps the recipe row and
//! its links in one transaction.

use crate::db::repositories::{
    IngredientRepository, RecipeRepository, RelationRepository, TagRepository, UserRepository,
};
use crate::models::{
    IngredientLine, Profile, Recipe, RecipeDetail, RecipeFilter, RecipeInput,
};
use anyhow::Context;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Maximum recipe name length
const MAX_NAME_LEN: usize = 200;

/// Inclusive bounds for per-recipe ingredient amounts
const MIN_AMOUNT: i32 = 1;
const MAX_AMOUNT: i32 = 1000;

/// Error types for recipe service operations
#[derive(Debug, thiserror::Error)]
pub enum RecipeServiceError {
    /// Recipe, ingredient, tag or user not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Requesting user is not the recipe's author
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Recipe service
pub struct RecipeService {
    recipes: Arc<dyn RecipeRepository>,
    ingredients: Arc<dyn IngredientRepository>,
    tags: Arc<dyn TagRepository>,
    users: Arc<dyn UserRepository>,
    relations: Arc<dyn RelationRepository>,
}

impl RecipeService {
    /// Create a new recipe service
    pub fn new(
        recipes: Arc<dyn RecipeRepository>,
        ingredients: Arc<dyn IngredientRepository>,
        tags: Arc<dyn TagRepository>,
        users: Arc<dyn UserRepository>,
        relations: Arc<dyn RelationRepository>,
    ) -> Self {
        Self {
            recipes,
            ingredients,
            tags,
            users,
            relations,
        }
    }

    /// Create a new recipe for `author_id`.
    ///
    /// The recipe row, its ingredient links and its tag links are
    /// persisted atomically; a validation failure persists nothing.
    ///
    /// # Errors
    /// - `ValidationError` on an empty ingredient or tag list, duplicate
    ///   entries, an out-of-range amount or cooking time, or an empty name
    /// - `NotFound` when the author or a referenced ingredient/tag is absent
    pub async fn create(
        &self,
        author_id: i64,
        input: &RecipeInput,
    ) -> Result<Recipe, RecipeServiceError> {
        if !self
            .users
            .exists(author_id)
            .await
            .context("Failed to check author")?
        {
            return Err(RecipeServiceError::NotFound(format!(
                "User with ID {} not found",
                author_id
            )));
        }

        self.validate_input(input).await?;

        let recipe = self
            .recipes
            .create(author_id, input)
            .await
            .context("Failed to create recipe")?;

        tracing::debug!(recipe_id = recipe.id, author_id, "Created recipe");
        Ok(recipe)
    }

    /// Replace a recipe's fields, ingredient list and tag set.
    ///
    /// Clear-then-rewrite semantics: the lists in `input` fully replace
    /// the stored ones. Only the author may update a recipe.
    pub async fn update(
        &self,
        recipe_id: i64,
        requesting_user_id: i64,
        input: &RecipeInput,
    ) -> Result<Recipe, RecipeServiceError> {
        let existing = self.get(recipe_id).await?;
        if existing.author_id != requesting_user_id {
            return Err(RecipeServiceError::PermissionDenied(
                "only the author can modify this recipe".to_string(),
            ));
        }

        self.validate_input(input).await?;

        let updated = self
            .recipes
            .replace(recipe_id, input)
            .await
            .context("Failed to update recipe")?;

        tracing::debug!(recipe_id, "Updated recipe");
        Ok(updated)
    }

    /// Delete a recipe. Only the author may delete it.
    ///
    /// Ingredient/tag links and shopping cart entries are removed with
    /// the recipe; favorites survive with a cleared recipe reference.
    pub async fn delete(
        &self,
        recipe_id: i64,
        requesting_user_id: i64,
    ) -> Result<(), RecipeServiceError> {
        let existing = self.get(recipe_id).await?;
        if existing.author_id != requesting_user_id {
            return Err(RecipeServiceError::PermissionDenied(
                "only the author can delete this recipe".to_string(),
            ));
        }

        self.recipes
            .delete(recipe_id)
            .await
            .context("Failed to delete recipe")?;

        tracing::debug!(recipe_id, "Deleted recipe");
        Ok(())
    }

    /// Get a recipe by ID
    pub async fn get(&self, recipe_id: i64) -> Result<Recipe, RecipeServiceError> {
        self.recipes
            .get_by_id(recipe_id)
            .await
            .context("Failed to get recipe")?
            .ok_or_else(|| {
                RecipeServiceError::NotFound(format!("Recipe with ID {} not found", recipe_id))
            })
    }

    /// List recipes matching a filter, newest first
    pub async fn list(&self, filter: &RecipeFilter) -> Result<Vec<Recipe>, RecipeServiceError> {
        self.recipes
            .list(filter)
            .await
            .context("Failed to list recipes")
            .map_err(Into::into)
    }

    /// Assemble the full read representation of a recipe for a viewer.
    pub async fn get_detail(
        &self,
        recipe_id: i64,
        viewer: Option<i64>,
    ) -> Result<RecipeDetail, RecipeServiceError> {
        let recipe = self.get(recipe_id).await?;

        let tags = self
            .tags
            .get_by_recipe_id(recipe.id)
            .await
            .context("Failed to get recipe tags")?;
        let ingredients = self
            .recipes
            .list_ingredients(recipe.id)
            .await
            .context("Failed to get recipe ingredients")?;

        let author = self
            .users
            .get_by_id(recipe.author_id)
            .await
            .context("Failed to get author")?
            .ok_or_else(|| {
                RecipeServiceError::NotFound(format!(
                    "User with ID {} not found",
                    recipe.author_id
                ))
            })?;

        let (is_subscribed, is_favorited, is_in_shopping_cart) = match viewer {
            Some(viewer_id) => (
                self.relations
                    .subscription_exists(viewer_id, author.id)
                    .await
                    .context("Failed to check subscription")?,
                self.relations
                    .favorite_exists(viewer_id, recipe.id)
                    .await
                    .context("Failed to check favorite")?,
                self.relations
                    .cart_exists(viewer_id, recipe.id)
                    .await
                    .context("Failed to check shopping cart")?,
            ),
            None => (false, false, false),
        };

        Ok(RecipeDetail {
            id: recipe.id,
            tags,
            author: Profile::from_user(&author, is_subscribed),
            ingredients,
            is_favorited,
            is_in_shopping_cart,
            name: recipe.name,
            image: recipe.image,
            text: recipe.text,
            cooking_time: recipe.cooking_time,
        })
    }

    /// Validate a write request: shape first, then referenced catalog
    /// entries, then duplicates (reported with catalog names).
    async fn validate_input(&self, input: &RecipeInput) -> Result<(), RecipeServiceError> {
        if input.name.trim().is_empty() {
            return Err(RecipeServiceError::ValidationError(
                "recipe name cannot be empty".to_string(),
            ));
        }
        if input.name.chars().count() > MAX_NAME_LEN {
            return Err(RecipeServiceError::ValidationError(format!(
                "recipe name is longer than {} characters",
                MAX_NAME_LEN
            )));
        }
        if input.text.trim().is_empty() {
            return Err(RecipeServiceError::ValidationError(
                "recipe description cannot be empty".to_string(),
            ));
        }
        if input.cooking_time < 1 {
            return Err(RecipeServiceError::ValidationError(
                "cooking time must be at least one minute".to_string(),
            ));
        }
        if input.ingredients.is_empty() {
            return Err(RecipeServiceError::ValidationError(
                "a recipe cannot be saved without ingredients".to_string(),
            ));
        }
        if input.tag_ids.is_empty() {
            return Err(RecipeServiceError::ValidationError(
                "at least one tag is required".to_string(),
            ));
        }

        if let Some(message) = check_amounts(&input.ingredients) {
            return Err(RecipeServiceError::ValidationError(message));
        }

        // Resolve referenced catalog entries before the duplicate check
        // so duplicates can be reported by name.
        let unique_ids: Vec<i64> = input
            .ingredients
            .iter()
            .map(|line| line.ingredient_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let found = self
            .ingredients
            .get_by_ids(&unique_ids)
            .await
            .context("Failed to resolve ingredients")?;
        if found.len() != unique_ids.len() {
            let known: HashSet<i64> = found.iter().map(|i| i.id).collect();
            let missing: Vec<String> = unique_ids
                .iter()
                .filter(|&&id| !known.contains(&id))
                .map(|id| id.to_string())
                .collect();
            return Err(RecipeServiceError::NotFound(format!(
                "unknown ingredient ids: {}",
                missing.join(", ")
            )));
        }
        let names: HashMap<i64, String> =
            found.into_iter().map(|i| (i.id, i.name)).collect();

        let duplicate_ids = find_duplicates(input.ingredients.iter().map(|l| l.ingredient_id));
        if !duplicate_ids.is_empty() {
            let listed: Vec<String> = duplicate_ids
                .iter()
                .map(|id| format!("\"{}\"", names[id]))
                .collect();
            return Err(RecipeServiceError::ValidationError(format!(
                "duplicated ingredients: {}",
                listed.join(", ")
            )));
        }

        let unique_tag_ids: Vec<i64> = input
            .tag_ids
            .iter()
            .copied()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let found_tags = self
            .tags
            .get_by_ids(&unique_tag_ids)
            .await
            .context("Failed to resolve tags")?;
        if found_tags.len() != unique_tag_ids.len() {
            let known: HashSet<i64> = found_tags.iter().map(|t| t.id).collect();
            let missing: Vec<String> = unique_tag_ids
                .iter()
                .filter(|&&id| !known.contains(&id))
                .map(|id| id.to_string())
                .collect();
            return Err(RecipeServiceError::NotFound(format!(
                "unknown tag ids: {}",
                missing.join(", ")
            )));
        }
        let tag_names: HashMap<i64, String> =
            found_tags.into_iter().map(|t| (t.id, t.name)).collect();

        let duplicate_tags = find_duplicates(input.tag_ids.iter().copied());
        if !duplicate_tags.is_empty() {
            let listed: Vec<String> = duplicate_tags
                .iter()
                .map(|id| format!("\"{}\"", tag_names[id]))
                .collect();
            return Err(RecipeServiceError::ValidationError(format!(
                "duplicated tags: {}",
                listed.join(", ")
            )));
        }

        Ok(())
    }
}

/// Collect every out-of-range amount into one message, or None when all
/// amounts are valid.
fn check_amounts(lines: &[IngredientLine]) -> Option<String> {
    let offending: Vec<String> = lines
        .iter()
        .filter(|line| line.amount < MIN_AMOUNT || line.amount > MAX_AMOUNT)
        .map(|line| format!("{} (ingredient id {})", line.amount, line.ingredient_id))
        .collect();

    if offending.is_empty() {
        None
    } else {
        Some(format!(
            "ingredient amounts must be between {} and {}, got: {}",
            MIN_AMOUNT,
            MAX_AMOUNT,
            offending.join(", ")
        ))
    }
}

/// IDs that occur more than once, in first-occurrence order, each
/// reported once.
fn find_duplicates(ids: impl Iterator<Item = i64>) -> Vec<i64> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for id in ids {
        if !seen.insert(id) && !duplicates.contains(&id) {
            duplicates.push(id);
        }
    }
    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        SqlxIngredientRepository, SqlxRecipeRepository, SqlxRelationRepository, SqlxTagRepository,
        SqlxUserRepository,
    };
    use crate::db::{create_test_pool, migrations, DynDatabasePool};
    use crate::models::{CreateUserInput, Ingredient, Tag};

    struct Fixture {
        pool: DynDatabasePool,
        service: RecipeService,
        author_id: i64,
        flour_id: i64,
        egg_id: i64,
        breakfast_id: i64,
    }

    async fn setup() -> Fixture {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let users = SqlxUserRepository::new(pool.clone());
        let author = users
            .create(&CreateUserInput {
                username: "chef".to_string(),
                email: "chef@example.com".to_string(),
                first_name: "Julia".to_string(),
                last_name: "Child".to_string(),
            })
            .await
            .unwrap();

        let ingredient_repo = SqlxIngredientRepository::new(pool.clone());
        let flour = ingredient_repo
            .create(&Ingredient::new("Flour".to_string(), "g".to_string()))
            .await
            .unwrap();
        let egg = ingredient_repo
            .create(&Ingredient::new("Egg".to_string(), "pcs".to_string()))
            .await
            .unwrap();

        let tag_repo = SqlxTagRepository::new(pool.clone());
        let breakfast = tag_repo
            .create(&Tag::new("Breakfast".to_string(), None, "breakfast".to_string()))
            .await
            .unwrap();

        let service = RecipeService::new(
            SqlxRecipeRepository::boxed(pool.clone()),
            SqlxIngredientRepository::boxed(pool.clone()),
            SqlxTagRepository::boxed(pool.clone()),
            SqlxUserRepository::boxed(pool.clone()),
            SqlxRelationRepository::boxed(pool.clone()),
        );

        Fixture {
            pool,
            service,
            author_id: author.id,
            flour_id: flour.id,
            egg_id: egg.id,
            breakfast_id: breakfast.id,
        }
    }

    fn pancakes(fx: &Fixture) -> RecipeInput {
        RecipeInput {
            name: "Pancakes".to_string(),
            text: "Mix and fry.".to_string(),
            cooking_time: 20,
            image: None,
            ingredients: vec![
                IngredientLine {
                    ingredient_id: fx.flour_id,
                    amount: 200,
                },
                IngredientLine {
                    ingredient_id: fx.egg_id,
                    amount: 2,
                },
            ],
            tag_ids: vec![fx.breakfast_id],
        }
    }

    #[tokio::test]
    async fn test_create_valid_recipe() {
        let fx = setup().await;

        let recipe = fx
            .service
            .create(fx.author_id, &pancakes(&fx))
            .await
            .expect("Failed to create recipe");
        assert!(recipe.id > 0);
        assert_eq!(recipe.author_id, fx.author_id);
    }

    #[tokio::test]
    async fn test_create_unknown_author_fails() {
        let fx = setup().await;

        let result = fx.service.create(999, &pancakes(&fx)).await;
        assert!(matches!(result, Err(RecipeServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_empty_ingredients_fails() {
        let fx = setup().await;

        let mut input = pancakes(&fx);
        input.ingredients.clear();
        let result = fx.service.create(fx.author_id, &input).await;
        assert!(matches!(result, Err(RecipeServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_create_empty_tags_fails() {
        let fx = setup().await;

        let mut input = pancakes(&fx);
        input.tag_ids.clear();
        let result = fx.service.create(fx.author_id, &input).await;
        assert!(matches!(result, Err(RecipeServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_create_duplicate_ingredients_reports_all_names() {
        let fx = setup().await;

        let mut input = pancakes(&fx);
        input.ingredients.push(IngredientLine {
            ingredient_id: fx.flour_id,
            amount: 50,
        });
        input.ingredients.push(IngredientLine {
            ingredient_id: fx.egg_id,
            amount: 1,
        });

        let result = fx.service.create(fx.author_id, &input).await;
        match result {
            Err(RecipeServiceError::ValidationError(message)) => {
                // Both repeated ingredients appear in the single message
                assert!(message.contains("\"Flour\""), "message: {}", message);
                assert!(message.contains("\"Egg\""), "message: {}", message);
            }
            other => panic!("Expected validation error, got {:?}", other.map(|r| r.id)),
        }
    }

    #[tokio::test]
    async fn test_create_duplicate_tags_fails() {
        let fx = setup().await;

        let mut input = pancakes(&fx);
        input.tag_ids.push(fx.breakfast_id);

        let result = fx.service.create(fx.author_id, &input).await;
        match result {
            Err(RecipeServiceError::ValidationError(message)) => {
                assert!(message.contains("\"Breakfast\""), "message: {}", message);
            }
            other => panic!("Expected validation error, got {:?}", other.map(|r| r.id)),
        }
    }

    #[tokio::test]
    async fn test_create_amount_out_of_range_fails() {
        let fx = setup().await;

        for amount in [0, -5, 1001] {
            let mut input = pancakes(&fx);
            input.ingredients[0].amount = amount;
            let result = fx.service.create(fx.author_id, &input).await;
            assert!(
                matches!(result, Err(RecipeServiceError::ValidationError(_))),
                "amount {} should be rejected",
                amount
            );
        }
    }

    #[tokio::test]
    async fn test_create_amount_bounds_accepted() {
        let fx = setup().await;

        for amount in [1, 1000] {
            let mut input = pancakes(&fx);
            input.name = format!("Pancakes {}", amount);
            input.ingredients[0].amount = amount;
            fx.service
                .create(fx.author_id, &input)
                .await
                .unwrap_or_else(|e| panic!("amount {} should be accepted: {}", amount, e));
        }
    }

    #[tokio::test]
    async fn test_create_unknown_ingredient_fails() {
        let fx = setup().await;

        let mut input = pancakes(&fx);
        input.ingredients[0].ingredient_id = 4242;
        let result = fx.service.create(fx.author_id, &input).await;
        assert!(matches!(result, Err(RecipeServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_unknown_tag_fails() {
        let fx = setup().await;

        let mut input = pancakes(&fx);
        input.tag_ids = vec![4242];
        let result = fx.service.create(fx.author_id, &input).await;
        assert!(matches!(result, Err(RecipeServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_zero_cooking_time_fails() {
        let fx = setup().await;

        let mut input = pancakes(&fx);
        input.cooking_time = 0;
        let result = fx.service.create(fx.author_id, &input).await;
        assert!(matches!(result, Err(RecipeServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_invalid_create_persists_nothing() {
        let fx = setup().await;

        let mut input = pancakes(&fx);
        input.tag_ids.clear();
        let _ = fx.service.create(fx.author_id, &input).await;

        let all = fx
            .service
            .list(&RecipeFilter::new())
            .await
            .expect("Failed to list");
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn test_update_by_author() {
        let fx = setup().await;
        let recipe = fx.service.create(fx.author_id, &pancakes(&fx)).await.unwrap();

        let mut input = pancakes(&fx);
        input.name = "Thin pancakes".to_string();
        input.ingredients = vec![IngredientLine {
            ingredient_id: fx.egg_id,
            amount: 3,
        }];

        let updated = fx
            .service
            .update(recipe.id, fx.author_id, &input)
            .await
            .expect("Failed to update");
        assert_eq!(updated.name, "Thin pancakes");

        let detail = fx
            .service
            .get_detail(recipe.id, None)
            .await
            .expect("Failed to get detail");
        assert_eq!(detail.ingredients.len(), 1);
        assert_eq!(detail.ingredients[0].name, "Egg");
    }

    #[tokio::test]
    async fn test_update_by_non_author_is_denied() {
        let fx = setup().await;
        let recipe = fx.service.create(fx.author_id, &pancakes(&fx)).await.unwrap();

        let users = SqlxUserRepository::new(fx.pool.clone());
        let other = users
            .create(&CreateUserInput {
                username: "intruder".to_string(),
                email: "intruder@example.com".to_string(),
                first_name: "Not".to_string(),
                last_name: "Author".to_string(),
            })
            .await
            .unwrap();

        let result = fx.service.update(recipe.id, other.id, &pancakes(&fx)).await;
        assert!(matches!(
            result,
            Err(RecipeServiceError::PermissionDenied(_))
        ));
    }

    #[tokio::test]
    async fn test_update_with_empty_ingredients_keeps_previous_links() {
        let fx = setup().await;
        let recipe = fx.service.create(fx.author_id, &pancakes(&fx)).await.unwrap();

        let mut input = pancakes(&fx);
        input.ingredients.clear();

        let result = fx.service.update(recipe.id, fx.author_id, &input).await;
        assert!(matches!(result, Err(RecipeServiceError::ValidationError(_))));

        let detail = fx
            .service
            .get_detail(recipe.id, None)
            .await
            .expect("Failed to get detail");
        assert_eq!(detail.ingredients.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_by_author() {
        let fx = setup().await;
        let recipe = fx.service.create(fx.author_id, &pancakes(&fx)).await.unwrap();

        fx.service
            .delete(recipe.id, fx.author_id)
            .await
            .expect("Failed to delete");

        let result = fx.service.get(recipe.id).await;
        assert!(matches!(result, Err(RecipeServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_by_non_author_is_denied() {
        let fx = setup().await;
        let recipe = fx.service.create(fx.author_id, &pancakes(&fx)).await.unwrap();

        let users = SqlxUserRepository::new(fx.pool.clone());
        let other = users
            .create(&CreateUserInput {
                username: "intruder".to_string(),
                email: "intruder@example.com".to_string(),
                first_name: "Not".to_string(),
                last_name: "Author".to_string(),
            })
            .await
            .unwrap();

        let result = fx.service.delete(recipe.id, other.id).await;
        assert!(matches!(
            result,
            Err(RecipeServiceError::PermissionDenied(_))
        ));
        assert!(fx.service.get(recipe.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_get_detail_shape() {
        let fx = setup().await;
        let recipe = fx.service.create(fx.author_id, &pancakes(&fx)).await.unwrap();

        let detail = fx
            .service
            .get_detail(recipe.id, Some(fx.author_id))
            .await
            .expect("Failed to get detail");

        assert_eq!(detail.id, recipe.id);
        assert_eq!(detail.name, "Pancakes");
        assert_eq!(detail.author.username, "chef");
        assert_eq!(detail.tags.len(), 1);
        assert_eq!(detail.tags[0].slug, "breakfast");
        assert_eq!(detail.ingredients.len(), 2);
        assert!(!detail.is_favorited);
        assert!(!detail.is_in_shopping_cart);
    }

    #[tokio::test]
    async fn test_get_detail_viewer_flags() {
        let fx = setup().await;
        let recipe = fx.service.create(fx.author_id, &pancakes(&fx)).await.unwrap();

        let users = SqlxUserRepository::new(fx.pool.clone());
        let viewer = users
            .create(&CreateUserInput {
                username: "viewer".to_string(),
                email: "viewer@example.com".to_string(),
                first_name: "Vera".to_string(),
                last_name: "Viewer".to_string(),
            })
            .await
            .unwrap();

        let relations = SqlxRelationRepository::new(fx.pool.clone());
        relations.favorite_add(viewer.id, recipe.id).await.unwrap();
        relations.cart_add(viewer.id, recipe.id).await.unwrap();
        relations
            .subscription_add(viewer.id, fx.author_id)
            .await
            .unwrap();

        let detail = fx
            .service
            .get_detail(recipe.id, Some(viewer.id))
            .await
            .expect("Failed to get detail");
        assert!(detail.is_favorited);
        assert!(detail.is_in_shopping_cart);
        assert!(detail.author.is_subscribed);
    }

    // ========================================================================
    // Pure helper tests
    // ========================================================================

    #[test]
    fn test_find_duplicates_reports_each_once_in_order() {
        let duplicates = find_duplicates([5, 3, 5, 3, 5, 9].into_iter());
        assert_eq!(duplicates, vec![5, 3]);

        assert!(find_duplicates([1, 2, 3].into_iter()).is_empty());
    }

    #[test]
    fn test_check_amounts_collects_all_offenders() {
        let lines = vec![
            IngredientLine {
                ingredient_id: 1,
                amount: 0,
            },
            IngredientLine {
                ingredient_id: 2,
                amount: 500,
            },
            IngredientLine {
                ingredient_id: 3,
                amount: 2000,
            },
        ];

        let message = check_amounts(&lines).expect("Expected offenders");
        assert!(message.contains("0 (ingredient id 1)"));
        assert!(message.contains("2000 (ingredient id 3)"));
        assert!(!message.contains("(ingredient id 2)"));

        assert!(check_amounts(&lines[1..2]).is_none());
    }

    // ========================================================================
    // Property-based tests
    // ========================================================================

    use proptest::prelude::*;

    proptest! {
        /// Amounts inside [1, 1000] never trip the range check; any
        /// amount outside it always does.
        #[test]
        fn property_amount_range_check(amounts in proptest::collection::vec(-2000i32..4000, 1..20)) {
            let lines: Vec<IngredientLine> = amounts
                .iter()
                .enumerate()
                .map(|(i, &amount)| IngredientLine {
                    ingredient_id: i as i64 + 1,
                    amount,
                })
                .collect();

            let has_offender = amounts.iter().any(|&a| !(1..=1000).contains(&a));
            let result = check_amounts(&lines);
            prop_assert_eq!(result.is_some(), has_offender);

            if let Some(message) = result {
                for line in &lines {
                    let fragment = format!("(ingredient id {})", line.ingredient_id);
                    prop_assert_eq!(
                        message.contains(&fragment),
                        !(1..=1000).contains(&line.amount),
                        "message: {}", message
                    );
                }
            }
        }

        /// Every ID that occurs more than once is reported, exactly once.
        #[test]
        fn property_duplicate_detection(ids in proptest::collection::vec(1i64..10, 0..30)) {
            let duplicates = find_duplicates(ids.iter().copied());

            for id in 1i64..10 {
                let occurrences = ids.iter().filter(|&&x| x == id).count();
                let reported = duplicates.iter().filter(|&&x| x == id).count();
                prop_assert_eq!(reported, usize::from(occurrences > 1));
            }
        }
    }
}
