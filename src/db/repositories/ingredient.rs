//! Ingredient repository
//!
//! Database operations for the ingredient catalog: insertion (single
//! and bulk seeding), listing and name-prefix search.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{CatalogEntry, Ingredient};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row, SqlitePool};
use std::sync::Arc;

/// Ingredient repository trait
#[async_trait]
pub trait IngredientRepository: Send + Sync {
    /// Create a single ingredient
    async fn create(&self, ingredient: &Ingredient) -> Result<Ingredient>;

    /// Insert many catalog entries at once; returns how many were inserted
    async fn create_many(&self, entries: &[CatalogEntry]) -> Result<usize>;

    /// Get ingredient by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Ingredient>>;

    /// Get several ingredients by ID, in no particular order
    async fn get_by_ids(&self, ids: &[i64]) -> Result<Vec<Ingredient>>;

    /// List all ingredients ordered by name
    async fn list(&self) -> Result<Vec<Ingredient>>;

    /// Case-insensitive name-prefix search, ordered by name
    async fn search_by_prefix(&self, prefix: &str) -> Result<Vec<Ingredient>>;
}

/// SQLx-based ingredient repository implementation
pub struct SqlxIngredientRepository {
    pool: DynDatabasePool,
}

impl SqlxIngredientRepository {
    /// Create a new SQLx ingredient repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn IngredientRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl IngredientRepository for SqlxIngredientRepository {
    async fn create(&self, ingredient: &Ingredient) -> Result<Ingredient> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_ingredient_sqlite(self.pool.as_sqlite().unwrap(), ingredient).await
            }
            DatabaseDriver::Postgres => {
                create_ingredient_postgres(self.pool.as_postgres().unwrap(), ingredient).await
            }
        }
    }

    async fn create_many(&self, entries: &[CatalogEntry]) -> Result<usize> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_many_sqlite(self.pool.as_sqlite().unwrap(), entries).await
            }
            DatabaseDriver::Postgres => {
                create_many_postgres(self.pool.as_postgres().unwrap(), entries).await
            }
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Ingredient>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_ingredient_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Postgres => {
                get_ingredient_by_id_postgres(self.pool.as_postgres().unwrap(), id).await
            }
        }
    }

    async fn get_by_ids(&self, ids: &[i64]) -> Result<Vec<Ingredient>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_ingredients_by_ids_sqlite(self.pool.as_sqlite().unwrap(), ids).await
            }
            DatabaseDriver::Postgres => {
                get_ingredients_by_ids_postgres(self.pool.as_postgres().unwrap(), ids).await
            }
        }
    }

    async fn list(&self) -> Result<Vec<Ingredient>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_ingredients_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Postgres => {
                list_ingredients_postgres(self.pool.as_postgres().unwrap()).await
            }
        }
    }

    async fn search_by_prefix(&self, prefix: &str) -> Result<Vec<Ingredient>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                search_by_prefix_sqlite(self.pool.as_sqlite().unwrap(), prefix).await
            }
            DatabaseDriver::Postgres => {
                search_by_prefix_postgres(self.pool.as_postgres().unwrap(), prefix).await
            }
        }
    }
}

/// Escape LIKE wildcards in a user-supplied prefix
fn escape_like_pattern(prefix: &str) -> String {
    prefix
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_ingredient_sqlite(pool: &SqlitePool, ingredient: &Ingredient) -> Result<Ingredient> {
    let result = sqlx::query(
        r#"
        INSERT INTO ingredients (name, name_lower, measurement_unit)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(&ingredient.name)
    .bind(ingredient.name.to_lowercase())
    .bind(&ingredient.measurement_unit)
    .execute(pool)
    .await
    .context("Failed to create ingredient")?;

    Ok(Ingredient {
        id: result.last_insert_rowid(),
        name: ingredient.name.clone(),
        measurement_unit: ingredient.measurement_unit.clone(),
    })
}

async fn create_many_sqlite(pool: &SqlitePool, entries: &[CatalogEntry]) -> Result<usize> {
    let mut tx = pool.begin().await.context("Failed to start transaction")?;

    for entry in entries {
        sqlx::query(
            r#"
            INSERT INTO ingredients (name, name_lower, measurement_unit)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&entry.name)
        .bind(entry.name.to_lowercase())
        .bind(&entry.measurement_unit)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("Failed to insert catalog entry: {}", entry.name))?;
    }

    tx.commit().await.context("Failed to commit transaction")?;
    Ok(entries.len())
}

async fn get_ingredient_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Ingredient>> {
    let row = sqlx::query(
        r#"
        SELECT id, name, measurement_unit
        FROM ingredients
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get ingredient by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_ingredient_sqlite(&row)?)),
        None => Ok(None),
    }
}

async fn get_ingredients_by_ids_sqlite(pool: &SqlitePool, ids: &[i64]) -> Result<Vec<Ingredient>> {
    let placeholders = vec!["?"; ids.len()].join(", ");
    let query = format!(
        "SELECT id, name, measurement_unit FROM ingredients WHERE id IN ({})",
        placeholders
    );

    let mut q = sqlx::query(&query);
    for id in ids {
        q = q.bind(id);
    }

    let rows = q
        .fetch_all(pool)
        .await
        .context("Failed to get ingredients by IDs")?;

    let mut ingredients = Vec::new();
    for row in rows {
        ingredients.push(row_to_ingredient_sqlite(&row)?);
    }

    Ok(ingredients)
}

async fn list_ingredients_sqlite(pool: &SqlitePool) -> Result<Vec<Ingredient>> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, measurement_unit
        FROM ingredients
        ORDER BY name
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list ingredients")?;

    let mut ingredients = Vec::new();
    for row in rows {
        ingredients.push(row_to_ingredient_sqlite(&row)?);
    }

    Ok(ingredients)
}

async fn search_by_prefix_sqlite(pool: &SqlitePool, prefix: &str) -> Result<Vec<Ingredient>> {
    // Matched against the write-time folded column; folding the name in
    // SQL would miss non-ASCII prefixes on SQLite.
    let pattern = format!("{}%", escape_like_pattern(&prefix.to_lowercase()));

    let rows = sqlx::query(
        r#"
        SELECT id, name, measurement_unit
        FROM ingredients
        WHERE name_lower LIKE ? ESCAPE '\'
        ORDER BY name
        "#,
    )
    .bind(&pattern)
    .fetch_all(pool)
    .await
    .context("Failed to search ingredients")?;

    let mut ingredients = Vec::new();
    for row in rows {
        ingredients.push(row_to_ingredient_sqlite(&row)?);
    }

    Ok(ingredients)
}

fn row_to_ingredient_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Ingredient> {
    Ok(Ingredient {
        id: row.get("id"),
        name: row.get("name"),
        measurement_unit: row.get("measurement_unit"),
    })
}

// ============================================================================
// PostgreSQL implementations
// ============================================================================

async fn create_ingredient_postgres(pool: &PgPool, ingredient: &Ingredient) -> Result<Ingredient> {
    let row = sqlx::query(
        r#"
        INSERT INTO ingredients (name, name_lower, measurement_unit)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(&ingredient.name)
    .bind(ingredient.name.to_lowercase())
    .bind(&ingredient.measurement_unit)
    .fetch_one(pool)
    .await
    .context("Failed to create ingredient")?;

    Ok(Ingredient {
        id: row.get("id"),
        name: ingredient.name.clone(),
        measurement_unit: ingredient.measurement_unit.clone(),
    })
}

async fn create_many_postgres(pool: &PgPool, entries: &[CatalogEntry]) -> Result<usize> {
    let mut tx = pool.begin().await.context("Failed to start transaction")?;

    for entry in entries {
        sqlx::query(
            r#"
            INSERT INTO ingredients (name, name_lower, measurement_unit)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&entry.name)
        .bind(entry.name.to_lowercase())
        .bind(&entry.measurement_unit)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("Failed to insert catalog entry: {}", entry.name))?;
    }

    tx.commit().await.context("Failed to commit transaction")?;
    Ok(entries.len())
}

async fn get_ingredient_by_id_postgres(pool: &PgPool, id: i64) -> Result<Option<Ingredient>> {
    let row = sqlx::query(
        r#"
        SELECT id, name, measurement_unit
        FROM ingredients
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get ingredient by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_ingredient_postgres(&row)?)),
        None => Ok(None),
    }
}

async fn get_ingredients_by_ids_postgres(pool: &PgPool, ids: &[i64]) -> Result<Vec<Ingredient>> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, measurement_unit
        FROM ingredients
        WHERE id = ANY($1)
        "#,
    )
    .bind(ids)
    .fetch_all(pool)
    .await
    .context("Failed to get ingredients by IDs")?;

    let mut ingredients = Vec::new();
    for row in rows {
        ingredients.push(row_to_ingredient_postgres(&row)?);
    }

    Ok(ingredients)
}

async fn list_ingredients_postgres(pool: &PgPool) -> Result<Vec<Ingredient>> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, measurement_unit
        FROM ingredients
        ORDER BY name
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list ingredients")?;

    let mut ingredients = Vec::new();
    for row in rows {
        ingredients.push(row_to_ingredient_postgres(&row)?);
    }

    Ok(ingredients)
}

async fn search_by_prefix_postgres(pool: &PgPool, prefix: &str) -> Result<Vec<Ingredient>> {
    let pattern = format!("{}%", escape_like_pattern(&prefix.to_lowercase()));

    let rows = sqlx::query(
        r#"
        SELECT id, name, measurement_unit
        FROM ingredients
        WHERE name_lower LIKE $1
        ORDER BY name
        "#,
    )
    .bind(&pattern)
    .fetch_all(pool)
    .await
    .context("Failed to search ingredients")?;

    let mut ingredients = Vec::new();
    for row in rows {
        ingredients.push(row_to_ingredient_postgres(&row)?);
    }

    Ok(ingredients)
}

fn row_to_ingredient_postgres(row: &sqlx::postgres::PgRow) -> Result<Ingredient> {
    Ok(Ingredient {
        id: row.get("id"),
        name: row.get("name"),
        measurement_unit: row.get("measurement_unit"),
    })
}
