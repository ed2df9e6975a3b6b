//! User relationship repository
//!
//! Database operations for favorites, shopping cart entries and author
//! subscriptions, plus the grouped-sum query behind shopping-list
//! aggregation.
//!
//! Add operations rely on unique indexes as the last word: the service
//! layer pre-checks for duplicates, but a concurrent request can still
//! hit the constraint, and that error is translated upstream via
//! `is_unique_violation`.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Favorite, ShoppingCartEntry, ShoppingListItem, Subscription, User};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row, SqlitePool};
use std::sync::Arc;

/// User relationship repository trait
#[async_trait]
pub trait RelationRepository: Send + Sync {
    /// Create a favorite row
    async fn favorite_add(&self, user_id: i64, recipe_id: i64) -> Result<Favorite>;

    /// Delete a favorite row; returns whether one existed
    async fn favorite_remove(&self, user_id: i64, recipe_id: i64) -> Result<bool>;

    /// Check whether a favorite row exists
    async fn favorite_exists(&self, user_id: i64, recipe_id: i64) -> Result<bool>;

    /// Create a shopping cart entry
    async fn cart_add(&self, user_id: i64, recipe_id: i64) -> Result<ShoppingCartEntry>;

    /// Delete a shopping cart entry; returns whether one existed
    async fn cart_remove(&self, user_id: i64, recipe_id: i64) -> Result<bool>;

    /// Check whether a shopping cart entry exists
    async fn cart_exists(&self, user_id: i64, recipe_id: i64) -> Result<bool>;

    /// Create a subscription row
    async fn subscription_add(&self, user_id: i64, author_id: i64) -> Result<Subscription>;

    /// Delete a subscription row; returns whether one existed
    async fn subscription_remove(&self, user_id: i64, author_id: i64) -> Result<bool>;

    /// Check whether a subscription row exists
    async fn subscription_exists(&self, user_id: i64, author_id: i64) -> Result<bool>;

    /// List the authors a user is subscribed to, oldest subscription first
    async fn list_subscribed_authors(&self, user_id: i64) -> Result<Vec<User>>;

    /// Sum ingredient amounts across all recipes in a user's cart,
    /// grouped by (name, measurement unit), ordered by name
    async fn sum_cart_ingredients(&self, user_id: i64) -> Result<Vec<ShoppingListItem>>;
}

/// SQLx-based user relationship repository implementation
pub struct SqlxRelationRepository {
    pool: DynDatabasePool,
}

impl SqlxRelationRepository {
    /// Create a new SQLx relation repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn RelationRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl RelationRepository for SqlxRelationRepository {
    async fn favorite_add(&self, user_id: i64, recipe_id: i64) -> Result<Favorite> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                favorite_add_sqlite(self.pool.as_sqlite().unwrap(), user_id, recipe_id).await
            }
            DatabaseDriver::Postgres => {
                favorite_add_postgres(self.pool.as_postgres().unwrap(), user_id, recipe_id).await
            }
        }
    }

    async fn favorite_remove(&self, user_id: i64, recipe_id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                remove_pair_sqlite(
                    self.pool.as_sqlite().unwrap(),
                    "DELETE FROM favorites WHERE user_id = ? AND recipe_id = ?",
                    user_id,
                    recipe_id,
                )
                .await
            }
            DatabaseDriver::Postgres => {
                remove_pair_postgres(
                    self.pool.as_postgres().unwrap(),
                    "DELETE FROM favorites WHERE user_id = $1 AND recipe_id = $2",
                    user_id,
                    recipe_id,
                )
                .await
            }
        }
    }

    async fn favorite_exists(&self, user_id: i64, recipe_id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                exists_pair_sqlite(
                    self.pool.as_sqlite().unwrap(),
                    "SELECT COUNT(*) as count FROM favorites WHERE user_id = ? AND recipe_id = ?",
                    user_id,
                    recipe_id,
                )
                .await
            }
            DatabaseDriver::Postgres => {
                exists_pair_postgres(
                    self.pool.as_postgres().unwrap(),
                    "SELECT COUNT(*) as count FROM favorites WHERE user_id = $1 AND recipe_id = $2",
                    user_id,
                    recipe_id,
                )
                .await
            }
        }
    }

    async fn cart_add(&self, user_id: i64, recipe_id: i64) -> Result<ShoppingCartEntry> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                cart_add_sqlite(self.pool.as_sqlite().unwrap(), user_id, recipe_id).await
            }
            DatabaseDriver::Postgres => {
                cart_add_postgres(self.pool.as_postgres().unwrap(), user_id, recipe_id).await
            }
        }
    }

    async fn cart_remove(&self, user_id: i64, recipe_id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                remove_pair_sqlite(
                    self.pool.as_sqlite().unwrap(),
                    "DELETE FROM shopping_cart WHERE user_id = ? AND recipe_id = ?",
                    user_id,
                    recipe_id,
                )
                .await
            }
            DatabaseDriver::Postgres => {
                remove_pair_postgres(
                    self.pool.as_postgres().unwrap(),
                    "DELETE FROM shopping_cart WHERE user_id = $1 AND recipe_id = $2",
                    user_id,
                    recipe_id,
                )
                .await
            }
        }
    }

    async fn cart_exists(&self, user_id: i64, recipe_id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                exists_pair_sqlite(
                    self.pool.as_sqlite().unwrap(),
                    "SELECT COUNT(*) as count FROM shopping_cart WHERE user_id = ? AND recipe_id = ?",
                    user_id,
                    recipe_id,
                )
                .await
            }
            DatabaseDriver::Postgres => {
                exists_pair_postgres(
                    self.pool.as_postgres().unwrap(),
                    "SELECT COUNT(*) as count FROM shopping_cart WHERE user_id = $1 AND recipe_id = $2",
                    user_id,
                    recipe_id,
                )
                .await
            }
        }
    }

    async fn subscription_add(&self, user_id: i64, author_id: i64) -> Result<Subscription> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                subscription_add_sqlite(self.pool.as_sqlite().unwrap(), user_id, author_id).await
            }
            DatabaseDriver::Postgres => {
                subscription_add_postgres(self.pool.as_postgres().unwrap(), user_id, author_id)
                    .await
            }
        }
    }

    async fn subscription_remove(&self, user_id: i64, author_id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                remove_pair_sqlite(
                    self.pool.as_sqlite().unwrap(),
                    "DELETE FROM subscriptions WHERE user_id = ? AND author_id = ?",
                    user_id,
                    author_id,
                )
                .await
            }
            DatabaseDriver::Postgres => {
                remove_pair_postgres(
                    self.pool.as_postgres().unwrap(),
                    "DELETE FROM subscriptions WHERE user_id = $1 AND author_id = $2",
                    user_id,
                    author_id,
                )
                .await
            }
        }
    }

    async fn subscription_exists(&self, user_id: i64, author_id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                exists_pair_sqlite(
                    self.pool.as_sqlite().unwrap(),
                    "SELECT COUNT(*) as count FROM subscriptions WHERE user_id = ? AND author_id = ?",
                    user_id,
                    author_id,
                )
                .await
            }
            DatabaseDriver::Postgres => {
                exists_pair_postgres(
                    self.pool.as_postgres().unwrap(),
                    "SELECT COUNT(*) as count FROM subscriptions WHERE user_id = $1 AND author_id = $2",
                    user_id,
                    author_id,
                )
                .await
            }
        }
    }

    async fn list_subscribed_authors(&self, user_id: i64) -> Result<Vec<User>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_subscribed_authors_sqlite(self.pool.as_sqlite().unwrap(), user_id).await
            }
            DatabaseDriver::Postgres => {
                list_subscribed_authors_postgres(self.pool.as_postgres().unwrap(), user_id).await
            }
        }
    }

    async fn sum_cart_ingredients(&self, user_id: i64) -> Result<Vec<ShoppingListItem>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sum_cart_ingredients_sqlite(self.pool.as_sqlite().unwrap(), user_id).await
            }
            DatabaseDriver::Postgres => {
                sum_cart_ingredients_postgres(self.pool.as_postgres().unwrap(), user_id).await
            }
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn favorite_add_sqlite(pool: &SqlitePool, user_id: i64, recipe_id: i64) -> Result<Favorite> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO favorites (user_id, recipe_id, created_at)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(recipe_id)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to add favorite")?;

    Ok(Favorite {
        id: result.last_insert_rowid(),
        user_id,
        recipe_id: Some(recipe_id),
        created_at: now,
    })
}

async fn cart_add_sqlite(
    pool: &SqlitePool,
    user_id: i64,
    recipe_id: i64,
) -> Result<ShoppingCartEntry> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO shopping_cart (user_id, recipe_id, created_at)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(recipe_id)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to add shopping cart entry")?;

    Ok(ShoppingCartEntry {
        id: result.last_insert_rowid(),
        user_id,
        recipe_id,
        created_at: now,
    })
}

async fn subscription_add_sqlite(
    pool: &SqlitePool,
    user_id: i64,
    author_id: i64,
) -> Result<Subscription> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO subscriptions (user_id, author_id, created_at)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(author_id)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to add subscription")?;

    Ok(Subscription {
        id: result.last_insert_rowid(),
        user_id,
        author_id,
        created_at: now,
    })
}

async fn remove_pair_sqlite(
    pool: &SqlitePool,
    query: &str,
    left: i64,
    right: i64,
) -> Result<bool> {
    let result = sqlx::query(query)
        .bind(left)
        .bind(right)
        .execute(pool)
        .await
        .context("Failed to delete relationship row")?;

    Ok(result.rows_affected() > 0)
}

async fn exists_pair_sqlite(pool: &SqlitePool, query: &str, left: i64, right: i64) -> Result<bool> {
    let row = sqlx::query(query)
        .bind(left)
        .bind(right)
        .fetch_one(pool)
        .await
        .context("Failed to check relationship row")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}

async fn list_subscribed_authors_sqlite(pool: &SqlitePool, user_id: i64) -> Result<Vec<User>> {
    let rows = sqlx::query(
        r#"
        SELECT u.id, u.username, u.email, u.first_name, u.last_name, u.created_at
        FROM subscriptions s
        INNER JOIN users u ON u.id = s.author_id
        WHERE s.user_id = ?
        ORDER BY s.id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("Failed to list subscribed authors")?;

    let mut authors = Vec::new();
    for row in rows {
        authors.push(User {
            id: row.get("id"),
            username: row.get("username"),
            email: row.get("email"),
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
            created_at: row.get("created_at"),
        });
    }

    Ok(authors)
}

async fn sum_cart_ingredients_sqlite(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<ShoppingListItem>> {
    let rows = sqlx::query(
        r#"
        SELECT i.name as name, i.measurement_unit as measurement_unit, SUM(ri.amount) as total_amount
        FROM shopping_cart sc
        INNER JOIN recipe_ingredients ri ON ri.recipe_id = sc.recipe_id
        INNER JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE sc.user_id = ?
        GROUP BY i.name, i.measurement_unit
        ORDER BY i.name, i.measurement_unit
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("Failed to aggregate shopping cart")?;

    let mut items = Vec::new();
    for row in rows {
        items.push(ShoppingListItem {
            name: row.get("name"),
            measurement_unit: row.get("measurement_unit"),
            total_amount: row.get("total_amount"),
        });
    }

    Ok(items)
}

// ============================================================================
// PostgreSQL implementations
// ============================================================================

async fn favorite_add_postgres(pool: &PgPool, user_id: i64, recipe_id: i64) -> Result<Favorite> {
    let now = Utc::now();

    let row = sqlx::query(
        r#"
        INSERT INTO favorites (user_id, recipe_id, created_at)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(recipe_id)
    .bind(now)
    .fetch_one(pool)
    .await
    .context("Failed to add favorite")?;

    Ok(Favorite {
        id: row.get("id"),
        user_id,
        recipe_id: Some(recipe_id),
        created_at: now,
    })
}

async fn cart_add_postgres(
    pool: &PgPool,
    user_id: i64,
    recipe_id: i64,
) -> Result<ShoppingCartEntry> {
    let now = Utc::now();

    let row = sqlx::query(
        r#"
        INSERT INTO shopping_cart (user_id, recipe_id, created_at)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(recipe_id)
    .bind(now)
    .fetch_one(pool)
    .await
    .context("Failed to add shopping cart entry")?;

    Ok(ShoppingCartEntry {
        id: row.get("id"),
        user_id,
        recipe_id,
        created_at: now,
    })
}

async fn subscription_add_postgres(
    pool: &PgPool,
    user_id: i64,
    author_id: i64,
) -> Result<Subscription> {
    let now = Utc::now();

    let row = sqlx::query(
        r#"
        INSERT INTO subscriptions (user_id, author_id, created_at)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(author_id)
    .bind(now)
    .fetch_one(pool)
    .await
    .context("Failed to add subscription")?;

    Ok(Subscription {
        id: row.get("id"),
        user_id,
        author_id,
        created_at: now,
    })
}

async fn remove_pair_postgres(pool: &PgPool, query: &str, left: i64, right: i64) -> Result<bool> {
    let result = sqlx::query(query)
        .bind(left)
        .bind(right)
        .execute(pool)
        .await
        .context("Failed to delete relationship row")?;

    Ok(result.rows_affected() > 0)
}

async fn exists_pair_postgres(pool: &PgPool, query: &str, left: i64, right: i64) -> Result<bool> {
    let row = sqlx::query(query)
        .bind(left)
        .bind(right)
        .fetch_one(pool)
        .await
        .context("Failed to check relationship row")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}

async fn list_subscribed_authors_postgres(pool: &PgPool, user_id: i64) -> Result<Vec<User>> {
    let rows = sqlx::query(
        r#"
        SELECT u.id, u.username, u.email, u.first_name, u.last_name, u.created_at
        FROM subscriptions s
        INNER JOIN users u ON u.id = s.author_id
        WHERE s.user_id = $1
        ORDER BY s.id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("Failed to list subscribed authors")?;

    let mut authors = Vec::new();
    for row in rows {
        authors.push(User {
            id: row.get("id"),
            username: row.get("username"),
            email: row.get("email"),
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
            created_at: row.get("created_at"),
        });
    }

    Ok(authors)
}

async fn sum_cart_ingredients_postgres(
    pool: &PgPool,
    user_id: i64,
) -> Result<Vec<ShoppingListItem>> {
    let rows = sqlx::query(
        r#"
        SELECT i.name as name, i.measurement_unit as measurement_unit, SUM(ri.amount) as total_amount
        FROM shopping_cart sc
        INNER JOIN recipe_ingredients ri ON ri.recipe_id = sc.recipe_id
        INNER JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE sc.user_id = $1
        GROUP BY i.name, i.measurement_unit
        ORDER BY i.name, i.measurement_unit
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("Failed to aggregate shopping cart")?;

    let mut items = Vec::new();
    for row in rows {
        items.push(ShoppingListItem {
            name: row.get("name"),
            measurement_unit: row.get("measurement_unit"),
            total_amount: row.get("total_amount"),
        });
    }

    Ok(items)
}
