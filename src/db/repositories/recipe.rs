//! Recipe repository
//!
//! Database operations for recipes and their quantified ingredient and
//! tag links. The recipe row and all of its link rows are written in a
//! single transaction: either the whole recipe lands or none of it
//! does.
//!
//! Input validation and permission checks live in the service layer;
//! this module assumes inputs that already passed them.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Recipe, RecipeFilter, RecipeIngredientDetail, RecipeInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row, SqlitePool};
use std::sync::Arc;

/// Recipe repository trait
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Create a recipe with its ingredient and tag links, atomically
    async fn create(&self, author_id: i64, input: &RecipeInput) -> Result<Recipe>;

    /// Get recipe by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Recipe>>;

    /// Replace a recipe's fields, ingredient list and tag set, atomically.
    ///
    /// Clear-then-rewrite: the links given in `input` become the
    /// recipe's entire link set.
    async fn replace(&self, id: i64, input: &RecipeInput) -> Result<Recipe>;

    /// Delete a recipe.
    ///
    /// Link rows and cart entries go with it (CASCADE); favorites keep
    /// a nulled recipe reference (SET NULL).
    async fn delete(&self, id: i64) -> Result<()>;

    /// List recipes matching a filter, newest first
    async fn list(&self, filter: &RecipeFilter) -> Result<Vec<Recipe>>;

    /// List an author's recipes, newest first, optionally truncated
    async fn list_by_author(&self, author_id: i64, limit: Option<i64>) -> Result<Vec<Recipe>>;

    /// Count an author's recipes
    async fn count_by_author(&self, author_id: i64) -> Result<i64>;

    /// Get a recipe's ingredient lines joined with catalog fields
    async fn list_ingredients(&self, recipe_id: i64) -> Result<Vec<RecipeIngredientDetail>>;
}

/// SQLx-based recipe repository implementation
pub struct SqlxRecipeRepository {
    pool: DynDatabasePool,
}

impl SqlxRecipeRepository {
    /// Create a new SQLx recipe repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn RecipeRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl RecipeRepository for SqlxRecipeRepository {
    async fn create(&self, author_id: i64, input: &RecipeInput) -> Result<Recipe> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_recipe_sqlite(self.pool.as_sqlite().unwrap(), author_id, input).await
            }
            DatabaseDriver::Postgres => {
                create_recipe_postgres(self.pool.as_postgres().unwrap(), author_id, input).await
            }
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Recipe>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_recipe_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Postgres => {
                get_recipe_by_id_postgres(self.pool.as_postgres().unwrap(), id).await
            }
        }
    }

    async fn replace(&self, id: i64, input: &RecipeInput) -> Result<Recipe> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                replace_recipe_sqlite(self.pool.as_sqlite().unwrap(), id, input).await
            }
            DatabaseDriver::Postgres => {
                replace_recipe_postgres(self.pool.as_postgres().unwrap(), id, input).await
            }
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                delete_recipe_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Postgres => {
                delete_recipe_postgres(self.pool.as_postgres().unwrap(), id).await
            }
        }
    }

    async fn list(&self, filter: &RecipeFilter) -> Result<Vec<Recipe>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_recipes_sqlite(self.pool.as_sqlite().unwrap(), filter).await
            }
            DatabaseDriver::Postgres => {
                list_recipes_postgres(self.pool.as_postgres().unwrap(), filter).await
            }
        }
    }

    async fn list_by_author(&self, author_id: i64, limit: Option<i64>) -> Result<Vec<Recipe>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_by_author_sqlite(self.pool.as_sqlite().unwrap(), author_id, limit).await
            }
            DatabaseDriver::Postgres => {
                list_by_author_postgres(self.pool.as_postgres().unwrap(), author_id, limit).await
            }
        }
    }

    async fn count_by_author(&self, author_id: i64) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                count_by_author_sqlite(self.pool.as_sqlite().unwrap(), author_id).await
            }
            DatabaseDriver::Postgres => {
                count_by_author_postgres(self.pool.as_postgres().unwrap(), author_id).await
            }
        }
    }

    async fn list_ingredients(&self, recipe_id: i64) -> Result<Vec<RecipeIngredientDetail>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_ingredients_sqlite(self.pool.as_sqlite().unwrap(), recipe_id).await
            }
            DatabaseDriver::Postgres => {
                list_ingredients_postgres(self.pool.as_postgres().unwrap(), recipe_id).await
            }
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_recipe_sqlite(
    pool: &SqlitePool,
    author_id: i64,
    input: &RecipeInput,
) -> Result<Recipe> {
    let now = Utc::now();
    let mut tx = pool.begin().await.context("Failed to start transaction")?;

    let result = sqlx::query(
        r#"
        INSERT INTO recipes (author_id, name, image, text, cooking_time, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(author_id)
    .bind(&input.name)
    .bind(&input.image)
    .bind(&input.text)
    .bind(input.cooking_time)
    .bind(now)
    .execute(&mut *tx)
    .await
    .context("Failed to create recipe")?;

    let id = result.last_insert_rowid();

    for line in &input.ingredients {
        sqlx::query(
            r#"
            INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(line.ingredient_id)
        .bind(line.amount)
        .execute(&mut *tx)
        .await
        .context("Failed to link ingredient")?;
    }

    for tag_id in &input.tag_ids {
        sqlx::query(
            r#"
            INSERT INTO recipe_tags (recipe_id, tag_id)
            VALUES (?, ?)
            "#,
        )
        .bind(id)
        .bind(tag_id)
        .execute(&mut *tx)
        .await
        .context("Failed to link tag")?;
    }

    tx.commit().await.context("Failed to commit transaction")?;

    Ok(Recipe {
        id,
        author_id,
        name: input.name.clone(),
        image: input.image.clone(),
        text: input.text.clone(),
        cooking_time: input.cooking_time,
        created_at: now,
    })
}

async fn get_recipe_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Recipe>> {
    let row = sqlx::query(
        r#"
        SELECT id, author_id, name, image, text, cooking_time, created_at
        FROM recipes
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get recipe by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_recipe_sqlite(&row)?)),
        None => Ok(None),
    }
}

async fn replace_recipe_sqlite(pool: &SqlitePool, id: i64, input: &RecipeInput) -> Result<Recipe> {
    let mut tx = pool.begin().await.context("Failed to start transaction")?;

    sqlx::query(
        r#"
        UPDATE recipes
        SET name = ?, image = ?, text = ?, cooking_time = ?
        WHERE id = ?
        "#,
    )
    .bind(&input.name)
    .bind(&input.image)
    .bind(&input.text)
    .bind(input.cooking_time)
    .bind(id)
    .execute(&mut *tx)
    .await
    .context("Failed to update recipe")?;

    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to clear ingredient links")?;

    sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to clear tag links")?;

    for line in &input.ingredients {
        sqlx::query(
            r#"
            INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(line.ingredient_id)
        .bind(line.amount)
        .execute(&mut *tx)
        .await
        .context("Failed to link ingredient")?;
    }

    for tag_id in &input.tag_ids {
        sqlx::query(
            r#"
            INSERT INTO recipe_tags (recipe_id, tag_id)
            VALUES (?, ?)
            "#,
        )
        .bind(id)
        .bind(tag_id)
        .execute(&mut *tx)
        .await
        .context("Failed to link tag")?;
    }

    tx.commit().await.context("Failed to commit transaction")?;

    get_recipe_by_id_sqlite(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Recipe not found after update"))
}

async fn delete_recipe_sqlite(pool: &SqlitePool, id: i64) -> Result<()> {
    // Links and cart entries cascade; favorites get recipe_id nulled.
    sqlx::query("DELETE FROM recipes WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete recipe")?;

    Ok(())
}

async fn list_recipes_sqlite(pool: &SqlitePool, filter: &RecipeFilter) -> Result<Vec<Recipe>> {
    let mut sql = String::from(
        "SELECT r.id, r.author_id, r.name, r.image, r.text, r.cooking_time, r.created_at FROM recipes r",
    );

    let mut clauses: Vec<String> = Vec::new();
    if filter.author_id.is_some() {
        clauses.push("r.author_id = ?".to_string());
    }
    if !filter.tag_slugs.is_empty() {
        let placeholders = vec!["?"; filter.tag_slugs.len()].join(", ");
        clauses.push(format!(
            "r.id IN (SELECT rt.recipe_id FROM recipe_tags rt INNER JOIN tags t ON t.id = rt.tag_id WHERE t.slug IN ({}))",
            placeholders
        ));
    }
    if filter.favorited_by.is_some() {
        clauses.push("r.id IN (SELECT recipe_id FROM favorites WHERE user_id = ?)".to_string());
    }
    if filter.in_shopping_cart_of.is_some() {
        clauses.push("r.id IN (SELECT recipe_id FROM shopping_cart WHERE user_id = ?)".to_string());
    }

    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY r.created_at DESC, r.id DESC");

    let mut q = sqlx::query(&sql);
    if let Some(author_id) = filter.author_id {
        q = q.bind(author_id);
    }
    for slug in &filter.tag_slugs {
        q = q.bind(slug);
    }
    if let Some(user_id) = filter.favorited_by {
        q = q.bind(user_id);
    }
    if let Some(user_id) = filter.in_shopping_cart_of {
        q = q.bind(user_id);
    }

    let rows = q.fetch_all(pool).await.context("Failed to list recipes")?;

    let mut recipes = Vec::new();
    for row in rows {
        recipes.push(row_to_recipe_sqlite(&row)?);
    }

    Ok(recipes)
}

async fn list_by_author_sqlite(
    pool: &SqlitePool,
    author_id: i64,
    limit: Option<i64>,
) -> Result<Vec<Recipe>> {
    // SQLite treats a negative LIMIT as "no limit"
    let rows = sqlx::query(
        r#"
        SELECT id, author_id, name, image, text, cooking_time, created_at
        FROM recipes
        WHERE author_id = ?
        ORDER BY created_at DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(author_id)
    .bind(limit.unwrap_or(-1))
    .fetch_all(pool)
    .await
    .context("Failed to list recipes by author")?;

    let mut recipes = Vec::new();
    for row in rows {
        recipes.push(row_to_recipe_sqlite(&row)?);
    }

    Ok(recipes)
}

async fn count_by_author_sqlite(pool: &SqlitePool, author_id: i64) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM recipes WHERE author_id = ?")
        .bind(author_id)
        .fetch_one(pool)
        .await
        .context("Failed to count recipes by author")?;

    Ok(row.get("count"))
}

async fn list_ingredients_sqlite(
    pool: &SqlitePool,
    recipe_id: i64,
) -> Result<Vec<RecipeIngredientDetail>> {
    let rows = sqlx::query(
        r#"
        SELECT i.id, i.name, i.measurement_unit, ri.amount
        FROM recipe_ingredients ri
        INNER JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE ri.recipe_id = ?
        ORDER BY i.id
        "#,
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await
    .context("Failed to list recipe ingredients")?;

    let mut details = Vec::new();
    for row in rows {
        details.push(RecipeIngredientDetail {
            id: row.get("id"),
            name: row.get("name"),
            measurement_unit: row.get("measurement_unit"),
            amount: row.get("amount"),
        });
    }

    Ok(details)
}

fn row_to_recipe_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Recipe> {
    Ok(Recipe {
        id: row.get("id"),
        author_id: row.get("author_id"),
        name: row.get("name"),
        image: row.get("image"),
        text: row.get("text"),
        cooking_time: row.get("cooking_time"),
        created_at: row.get("created_at"),
    })
}

// ============================================================================
// PostgreSQL implementations
// ============================================================================

async fn create_recipe_postgres(
    pool: &PgPool,
    author_id: i64,
    input: &RecipeInput,
) -> Result<Recipe> {
    let now = Utc::now();
    let mut tx = pool.begin().await.context("Failed to start transaction")?;

    let row = sqlx::query(
        r#"
        INSERT INTO recipes (author_id, name, image, text, cooking_time, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(author_id)
    .bind(&input.name)
    .bind(&input.image)
    .bind(&input.text)
    .bind(input.cooking_time)
    .bind(now)
    .fetch_one(&mut *tx)
    .await
    .context("Failed to create recipe")?;

    let id: i64 = row.get("id");

    for line in &input.ingredients {
        sqlx::query(
            r#"
            INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(id)
        .bind(line.ingredient_id)
        .bind(line.amount)
        .execute(&mut *tx)
        .await
        .context("Failed to link ingredient")?;
    }

    for tag_id in &input.tag_ids {
        sqlx::query(
            r#"
            INSERT INTO recipe_tags (recipe_id, tag_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(id)
        .bind(tag_id)
        .execute(&mut *tx)
        .await
        .context("Failed to link tag")?;
    }

    tx.commit().await.context("Failed to commit transaction")?;

    Ok(Recipe {
        id,
        author_id,
        name: input.name.clone(),
        image: input.image.clone(),
        text: input.text.clone(),
        cooking_time: input.cooking_time,
        created_at: now,
    })
}

async fn get_recipe_by_id_postgres(pool: &PgPool, id: i64) -> Result<Option<Recipe>> {
    let row = sqlx::query(
        r#"
        SELECT id, author_id, name, image, text, cooking_time, created_at
        FROM recipes
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get recipe by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_recipe_postgres(&row)?)),
        None => Ok(None),
    }
}

async fn replace_recipe_postgres(pool: &PgPool, id: i64, input: &RecipeInput) -> Result<Recipe> {
    let mut tx = pool.begin().await.context("Failed to start transaction")?;

    sqlx::query(
        r#"
        UPDATE recipes
        SET name = $1, image = $2, text = $3, cooking_time = $4
        WHERE id = $5
        "#,
    )
    .bind(&input.name)
    .bind(&input.image)
    .bind(&input.text)
    .bind(input.cooking_time)
    .bind(id)
    .execute(&mut *tx)
    .await
    .context("Failed to update recipe")?;

    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to clear ingredient links")?;

    sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to clear tag links")?;

    for line in &input.ingredients {
        sqlx::query(
            r#"
            INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(id)
        .bind(line.ingredient_id)
        .bind(line.amount)
        .execute(&mut *tx)
        .await
        .context("Failed to link ingredient")?;
    }

    for tag_id in &input.tag_ids {
        sqlx::query(
            r#"
            INSERT INTO recipe_tags (recipe_id, tag_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(id)
        .bind(tag_id)
        .execute(&mut *tx)
        .await
        .context("Failed to link tag")?;
    }

    tx.commit().await.context("Failed to commit transaction")?;

    get_recipe_by_id_postgres(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Recipe not found after update"))
}

async fn delete_recipe_postgres(pool: &PgPool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM recipes WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete recipe")?;

    Ok(())
}

async fn list_recipes_postgres(pool: &PgPool, filter: &RecipeFilter) -> Result<Vec<Recipe>> {
    let mut sql = String::from(
        "SELECT r.id, r.author_id, r.name, r.image, r.text, r.cooking_time, r.created_at FROM recipes r",
    );

    let mut clauses: Vec<String> = Vec::new();
    let mut next_param = 1;
    if filter.author_id.is_some() {
        clauses.push(format!("r.author_id = ${}", next_param));
        next_param += 1;
    }
    if !filter.tag_slugs.is_empty() {
        clauses.push(format!(
            "r.id IN (SELECT rt.recipe_id FROM recipe_tags rt INNER JOIN tags t ON t.id = rt.tag_id WHERE t.slug = ANY(${}))",
            next_param
        ));
        next_param += 1;
    }
    if filter.favorited_by.is_some() {
        clauses.push(format!(
            "r.id IN (SELECT recipe_id FROM favorites WHERE user_id = ${})",
            next_param
        ));
        next_param += 1;
    }
    if filter.in_shopping_cart_of.is_some() {
        clauses.push(format!(
            "r.id IN (SELECT recipe_id FROM shopping_cart WHERE user_id = ${})",
            next_param
        ));
    }

    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY r.created_at DESC, r.id DESC");

    let mut q = sqlx::query(&sql);
    if let Some(author_id) = filter.author_id {
        q = q.bind(author_id);
    }
    if !filter.tag_slugs.is_empty() {
        q = q.bind(&filter.tag_slugs);
    }
    if let Some(user_id) = filter.favorited_by {
        q = q.bind(user_id);
    }
    if let Some(user_id) = filter.in_shopping_cart_of {
        q = q.bind(user_id);
    }

    let rows = q.fetch_all(pool).await.context("Failed to list recipes")?;

    let mut recipes = Vec::new();
    for row in rows {
        recipes.push(row_to_recipe_postgres(&row)?);
    }

    Ok(recipes)
}

async fn list_by_author_postgres(
    pool: &PgPool,
    author_id: i64,
    limit: Option<i64>,
) -> Result<Vec<Recipe>> {
    // A NULL limit means "no limit" in PostgreSQL
    let rows = sqlx::query(
        r#"
        SELECT id, author_id, name, image, text, cooking_time, created_at
        FROM recipes
        WHERE author_id = $1
        ORDER BY created_at DESC, id DESC
        LIMIT $2
        "#,
    )
    .bind(author_id)
    .bind(limit)
    .fetch_all(pool)
    .await
    .context("Failed to list recipes by author")?;

    let mut recipes = Vec::new();
    for row in rows {
        recipes.push(row_to_recipe_postgres(&row)?);
    }

    Ok(recipes)
}

async fn count_by_author_postgres(pool: &PgPool, author_id: i64) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM recipes WHERE author_id = $1")
        .bind(author_id)
        .fetch_one(pool)
        .await
        .context("Failed to count recipes by author")?;

    Ok(row.get("count"))
}

async fn list_ingredients_postgres(
    pool: &PgPool,
    recipe_id: i64,
) -> Result<Vec<RecipeIngredientDetail>> {
    let rows = sqlx::query(
        r#"
        SELECT i.id, i.name, i.measurement_unit, ri.amount
        FROM recipe_ingredients ri
        INNER JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE ri.recipe_id = $1
        ORDER BY i.id
        "#,
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await
    .context("Failed to list recipe ingredients")?;

    let mut details = Vec::new();
    for row in rows {
        details.push(RecipeIngredientDetail {
            id: row.get("id"),
            name: row.get("name"),
            measurement_unit: row.get("measurement_unit"),
            amount: row.get("amount"),
        });
    }

    Ok(details)
}

fn row_to_recipe_postgres(row: &sqlx::postgres::PgRow) -> Result<Recipe> {
    Ok(Recipe {
        id: row.get("id"),
        author_id: row.get("author_id"),
        name: row.get("name"),
        image: row.get("image"),
        text: row.get("text"),
        cooking_time: row.get("cooking_time"),
        created_at: row.get("created_at"),
    })
}
