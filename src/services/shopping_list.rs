//! Shopping list service
//!
//! Aggregates a user's shopping cart into one consolidated ingredient
//! report and renders it as a downloadable plain-text document. The
//! whole operation is read-only; the cart itself is untouched.

use crate::config::ShoppingListConfig;
use crate::db::repositories::{RelationRepository, UserRepository};
use crate::models::ShoppingList;
use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;

/// Error types for shopping list operations
#[derive(Debug, thiserror::Error)]
pub enum ShoppingListServiceError {
    /// User not found
    #[error("User not found: {0}")]
    NotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Shopping list service
pub struct ShoppingListService {
    users: Arc<dyn UserRepository>,
    relations: Arc<dyn RelationRepository>,
    footer: String,
}

impl ShoppingListService {
    /// Create a new shopping list service with the default footer
    pub fn new(users: Arc<dyn UserRepository>, relations: Arc<dyn RelationRepository>) -> Self {
        Self::with_config(users, relations, &ShoppingListConfig::default())
    }

    /// Create a new shopping list service with a configured footer
    pub fn with_config(
        users: Arc<dyn UserRepository>,
        relations: Arc<dyn RelationRepository>,
        config: &ShoppingListConfig,
    ) -> Self {
        Self {
            users,
            relations,
            footer: config.footer.clone(),
        }
    }

    /// Build the aggregated shopping list for a user.
    ///
    /// Amounts are summed per (ingredient name, measurement unit) pair
    /// across every recipe in the cart; an empty cart yields an empty
    /// item list. Totals are independent of the order the recipes were
    /// added in.
    pub async fn build(&self, user_id: i64) -> Result<ShoppingList, ShoppingListServiceError> {
        let user = self
            .users
            .get_by_id(user_id)
            .await
            .context("Failed to get user")?
            .ok_or_else(|| {
                ShoppingListServiceError::NotFound(format!("User with ID {} not found", user_id))
            })?;

        let items = self
            .relations
            .sum_cart_ingredients(user_id)
            .await
            .context("Failed to aggregate shopping cart")?;

        Ok(ShoppingList {
            username: user.username.clone(),
            display_name: user.display_name(),
            generated_at: Utc::now(),
            items,
        })
    }

    /// Render a shopping list as the plain-text download body:
    /// a dated header naming the user, one `- name: total unit` line
    /// per ingredient, and the configured footer.
    pub fn render(&self, list: &ShoppingList) -> String {
        let mut text = format!(
            "Shopping list from {}\nUser: {} ({})\n",
            list.generated_at.format("%Y-%m-%d %H:%M"),
            list.display_name,
            list.username
        );

        for item in &list.items {
            text.push_str(&format!(
                "\n- {}: {} {}",
                item.name, item.total_amount, item.measurement_unit
            ));
        }

        text.push_str(&format!("\n\n{}", self.footer));
        text
    }

    /// Filename for the downloadable artifact, encoding the generation
    /// date and the username.
    pub fn filename(list: &ShoppingList) -> String {
        format!(
            "{}_{}_ShoppingCart.txt",
            list.generated_at.format("%Y-%m-%d"),
            list.username
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        IngredientRepository, RecipeRepository, RelationRepository, SqlxIngredientRepository,
        SqlxRecipeRepository, SqlxRelationRepository, SqlxTagRepository, SqlxUserRepository,
        TagRepository, UserRepository,
    };
    use crate::db::{create_test_pool, migrations, DynDatabasePool};
    use crate::models::{
        CreateUserInput, Ingredient, IngredientLine, RecipeInput, ShoppingListItem, Tag,
    };

    struct Fixture {
        service: ShoppingListService,
        relations: SqlxRelationRepository,
        recipes: SqlxRecipeRepository,
        ingredients: SqlxIngredientRepository,
        user_id: i64,
        author_id: i64,
        tag_id: i64,
    }

    async fn setup() -> (DynDatabasePool, Fixture) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let users = SqlxUserRepository::new(pool.clone());
        let user = users
            .create(&CreateUserInput {
                username: "eater".to_string(),
                email: "eater@example.com".to_string(),
                first_name: "Ann".to_string(),
                last_name: "Appetite".to_string(),
            })
            .await
            .unwrap();
        let author = users
            .create(&CreateUserInput {
                username: "chef".to_string(),
                email: "chef@example.com".to_string(),
                first_name: "Julia".to_string(),
                last_name: "Child".to_string(),
            })
            .await
            .unwrap();

        let tags = SqlxTagRepository::new(pool.clone());
        let tag = tags
            .create(&Tag::new("Breakfast".to_string(), None, "breakfast".to_string()))
            .await
            .unwrap();

        let service = ShoppingListService::new(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxRelationRepository::boxed(pool.clone()),
        );

        let fixture = Fixture {
            service,
            relations: SqlxRelationRepository::new(pool.clone()),
            recipes: SqlxRecipeRepository::new(pool.clone()),
            ingredients: SqlxIngredientRepository::new(pool.clone()),
            user_id: user.id,
            author_id: author.id,
            tag_id: tag.id,
        };
        (pool, fixture)
    }

    async fn add_recipe(fx: &Fixture, name: &str, lines: Vec<IngredientLine>) -> i64 {
        let recipe = fx
            .recipes
            .create(
                fx.author_id,
                &RecipeInput {
                    name: name.to_string(),
                    text: "Cook it.".to_string(),
                    cooking_time: 15,
                    image: None,
                    ingredients: lines,
                    tag_ids: vec![fx.tag_id],
                },
            )
            .await
            .expect("Failed to create recipe");
        recipe.id
    }

    #[tokio::test]
    async fn test_build_collapses_shared_ingredients() {
        let (_pool, fx) = setup().await;

        let flour = fx
            .ingredients
            .create(&Ingredient::new("Flour".to_string(), "g".to_string()))
            .await
            .unwrap();
        let egg = fx
            .ingredients
            .create(&Ingredient::new("Egg".to_string(), "pcs".to_string()))
            .await
            .unwrap();

        let pancakes = add_recipe(
            &fx,
            "Pancakes",
            vec![IngredientLine {
                ingredient_id: flour.id,
                amount: 200,
            }],
        )
        .await;
        let bread = add_recipe(
            &fx,
            "Bread",
            vec![
                IngredientLine {
                    ingredient_id: flour.id,
                    amount: 300,
                },
                IngredientLine {
                    ingredient_id: egg.id,
                    amount: 2,
                },
            ],
        )
        .await;

        fx.relations.cart_add(fx.user_id, pancakes).await.unwrap();
        fx.relations.cart_add(fx.user_id, bread).await.unwrap();

        let list = fx.service.build(fx.user_id).await.expect("Failed to build");

        assert_eq!(list.username, "eater");
        assert_eq!(list.display_name, "Ann Appetite");
        assert_eq!(
            list.items,
            vec![
                ShoppingListItem {
                    name: "Egg".to_string(),
                    measurement_unit: "pcs".to_string(),
                    total_amount: 2,
                },
                ShoppingListItem {
                    name: "Flour".to_string(),
                    measurement_unit: "g".to_string(),
                    total_amount: 500,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_same_name_different_unit_stays_separate() {
        let (_pool, fx) = setup().await;

        let milk_ml = fx
            .ingredients
            .create(&Ingredient::new("Milk".to_string(), "ml".to_string()))
            .await
            .unwrap();
        let milk_tbsp = fx
            .ingredients
            .create(&Ingredient::new("Milk".to_string(), "tbsp".to_string()))
            .await
            .unwrap();

        let recipe = add_recipe(
            &fx,
            "Porridge",
            vec![
                IngredientLine {
                    ingredient_id: milk_ml.id,
                    amount: 200,
                },
                IngredientLine {
                    ingredient_id: milk_tbsp.id,
                    amount: 3,
                },
            ],
        )
        .await;

        fx.relations.cart_add(fx.user_id, recipe).await.unwrap();

        let list = fx.service.build(fx.user_id).await.expect("Failed to build");
        assert_eq!(list.items.len(), 2);
        assert_eq!(list.items[0].measurement_unit, "ml");
        assert_eq!(list.items[0].total_amount, 200);
        assert_eq!(list.items[1].measurement_unit, "tbsp");
        assert_eq!(list.items[1].total_amount, 3);
    }

    #[tokio::test]
    async fn test_build_empty_cart() {
        let (_pool, fx) = setup().await;

        let list = fx.service.build(fx.user_id).await.expect("Failed to build");
        assert!(list.items.is_empty());
    }

    #[tokio::test]
    async fn test_build_unknown_user() {
        let (_pool, fx) = setup().await;

        let result = fx.service.build(4242).await;
        assert!(matches!(result, Err(ShoppingListServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_build_is_read_only() {
        let (_pool, fx) = setup().await;

        let flour = fx
            .ingredients
            .create(&Ingredient::new("Flour".to_string(), "g".to_string()))
            .await
            .unwrap();
        let recipe = add_recipe(
            &fx,
            "Pancakes",
            vec![IngredientLine {
                ingredient_id: flour.id,
                amount: 200,
            }],
        )
        .await;
        fx.relations.cart_add(fx.user_id, recipe).await.unwrap();

        fx.service.build(fx.user_id).await.expect("Failed to build");
        fx.service.build(fx.user_id).await.expect("Failed to build");

        assert!(fx
            .relations
            .cart_exists(fx.user_id, recipe)
            .await
            .expect("Failed to check cart"));
    }

    #[tokio::test]
    async fn test_render_layout() {
        let (_pool, fx) = setup().await;

        let flour = fx
            .ingredients
            .create(&Ingredient::new("Flour".to_string(), "g".to_string()))
            .await
            .unwrap();
        let recipe = add_recipe(
            &fx,
            "Pancakes",
            vec![IngredientLine {
                ingredient_id: flour.id,
                amount: 200,
            }],
        )
        .await;
        fx.relations.cart_add(fx.user_id, recipe).await.unwrap();

        let list = fx.service.build(fx.user_id).await.expect("Failed to build");
        let text = fx.service.render(&list);

        let expected_header = format!(
            "Shopping list from {}\nUser: Ann Appetite (eater)\n",
            list.generated_at.format("%Y-%m-%d %H:%M")
        );
        assert!(text.starts_with(&expected_header), "text: {}", text);
        assert!(text.contains("\n- Flour: 200 g"), "text: {}", text);
        assert!(
            text.ends_with("\n\nGenerated by the Mealshare grocery assistant"),
            "text: {}",
            text
        );
    }

    #[tokio::test]
    async fn test_filename_encodes_date_and_username() {
        let (_pool, fx) = setup().await;

        let list = fx.service.build(fx.user_id).await.expect("Failed to build");
        let filename = ShoppingListService::filename(&list);

        let expected = format!("{}_eater_ShoppingCart.txt", list.generated_at.format("%Y-%m-%d"));
        assert_eq!(filename, expected);
    }

    // ========================================================================
    // Property-based tests
    // ========================================================================

    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(10))]

        /// However a fixed set of amounts for one ingredient is split
        /// across cart recipes, the aggregated total is their sum.
        #[test]
        fn property_totals_invariant_under_partitioning(
            amounts in proptest::collection::vec(1i32..=1000, 1..6)
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let result: Result<(), TestCaseError> = rt.block_on(async {
                let (_pool, fx) = setup().await;

                let flour = fx
                    .ingredients
                    .create(&Ingredient::new("Flour".to_string(), "g".to_string()))
                    .await
                    .unwrap();

                // One recipe per amount, all queued in the cart
                for (i, &amount) in amounts.iter().enumerate() {
                    let recipe = add_recipe(
                        &fx,
                        &format!("Recipe {}", i),
                        vec![IngredientLine {
                            ingredient_id: flour.id,
                            amount,
                        }],
                    )
                    .await;
                    fx.relations.cart_add(fx.user_id, recipe).await.unwrap();
                }

                let list = fx.service.build(fx.user_id).await.expect("Failed to build");
                prop_assert_eq!(list.items.len(), 1);
                let expected: i64 = amounts.iter().map(|&a| a as i64).sum();
                prop_assert_eq!(list.items[0].total_amount, expected);

                Ok(())
            });
            result?;
        }
    }
}
