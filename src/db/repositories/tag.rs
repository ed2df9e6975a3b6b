//! Tag repository
//!
//! Database operations for the tag catalog and per-recipe tag lookup.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::Tag;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row, SqlitePool};
use std::sync::Arc;

/// Tag repository trait
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Create a new tag
    async fn create(&self, tag: &Tag) -> Result<Tag>;

    /// Get tag by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Tag>>;

    /// Get several tags by ID, in no particular order
    async fn get_by_ids(&self, ids: &[i64]) -> Result<Vec<Tag>>;

    /// Get tag by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Tag>>;

    /// List all tags ordered by ID
    async fn list(&self) -> Result<Vec<Tag>>;

    /// Get the tags attached to a recipe, ordered by ID
    async fn get_by_recipe_id(&self, recipe_id: i64) -> Result<Vec<Tag>>;
}

/// SQLx-based tag repository implementation
pub struct SqlxTagRepository {
    pool: DynDatabasePool,
}

impl SqlxTagRepository {
    /// Create a new SQLx tag repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn TagRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl TagRepository for SqlxTagRepository {
    async fn create(&self, tag: &Tag) -> Result<Tag> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_tag_sqlite(self.pool.as_sqlite().unwrap(), tag).await,
            DatabaseDriver::Postgres => {
                create_tag_postgres(self.pool.as_postgres().unwrap(), tag).await
            }
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Tag>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_tag_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Postgres => {
                get_tag_by_id_postgres(self.pool.as_postgres().unwrap(), id).await
            }
        }
    }

    async fn get_by_ids(&self, ids: &[i64]) -> Result<Vec<Tag>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_tags_by_ids_sqlite(self.pool.as_sqlite().unwrap(), ids).await
            }
            DatabaseDriver::Postgres => {
                get_tags_by_ids_postgres(self.pool.as_postgres().unwrap(), ids).await
            }
        }
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Tag>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_tag_by_slug_sqlite(self.pool.as_sqlite().unwrap(), slug).await
            }
            DatabaseDriver::Postgres => {
                get_tag_by_slug_postgres(self.pool.as_postgres().unwrap(), slug).await
            }
        }
    }

    async fn list(&self) -> Result<Vec<Tag>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_tags_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Postgres => list_tags_postgres(self.pool.as_postgres().unwrap()).await,
        }
    }

    async fn get_by_recipe_id(&self, recipe_id: i64) -> Result<Vec<Tag>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_tags_by_recipe_sqlite(self.pool.as_sqlite().unwrap(), recipe_id).await
            }
            DatabaseDriver::Postgres => {
                get_tags_by_recipe_postgres(self.pool.as_postgres().unwrap(), recipe_id).await
            }
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_tag_sqlite(pool: &SqlitePool, tag: &Tag) -> Result<Tag> {
    let result = sqlx::query(
        r#"
        INSERT INTO tags (name, color, slug)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(&tag.name)
    .bind(&tag.color)
    .bind(&tag.slug)
    .execute(pool)
    .await
    .context("Failed to create tag")?;

    Ok(Tag {
        id: result.last_insert_rowid(),
        name: tag.name.clone(),
        color: tag.color.clone(),
        slug: tag.slug.clone(),
    })
}

async fn get_tag_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Tag>> {
    let row = sqlx::query(
        r#"
        SELECT id, name, color, slug
        FROM tags
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get tag by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_tag_sqlite(&row)?)),
        None => Ok(None),
    }
}

async fn get_tags_by_ids_sqlite(pool: &SqlitePool, ids: &[i64]) -> Result<Vec<Tag>> {
    let placeholders = vec!["?"; ids.len()].join(", ");
    let query = format!(
        "SELECT id, name, color, slug FROM tags WHERE id IN ({})",
        placeholders
    );

    let mut q = sqlx::query(&query);
    for id in ids {
        q = q.bind(id);
    }

    let rows = q.fetch_all(pool).await.context("Failed to get tags by IDs")?;

    let mut tags = Vec::new();
    for row in rows {
        tags.push(row_to_tag_sqlite(&row)?);
    }

    Ok(tags)
}

async fn get_tag_by_slug_sqlite(pool: &SqlitePool, slug: &str) -> Result<Option<Tag>> {
    let row = sqlx::query(
        r#"
        SELECT id, name, color, slug
        FROM tags
        WHERE slug = ?
        "#,
    )
    .bind(slug)
    .fetch_optional(pool)
    .await
    .context("Failed to get tag by slug")?;

    match row {
        Some(row) => Ok(Some(row_to_tag_sqlite(&row)?)),
        None => Ok(None),
    }
}

async fn list_tags_sqlite(pool: &SqlitePool) -> Result<Vec<Tag>> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, color, slug
        FROM tags
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list tags")?;

    let mut tags = Vec::new();
    for row in rows {
        tags.push(row_to_tag_sqlite(&row)?);
    }

    Ok(tags)
}

async fn get_tags_by_recipe_sqlite(pool: &SqlitePool, recipe_id: i64) -> Result<Vec<Tag>> {
    let rows = sqlx::query(
        r#"
        SELECT t.id, t.name, t.color, t.slug
        FROM tags t
        INNER JOIN recipe_tags rt ON t.id = rt.tag_id
        WHERE rt.recipe_id = ?
        ORDER BY t.id
        "#,
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await
    .context("Failed to get tags by recipe")?;

    let mut tags = Vec::new();
    for row in rows {
        tags.push(row_to_tag_sqlite(&row)?);
    }

    Ok(tags)
}

fn row_to_tag_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Tag> {
    Ok(Tag {
        id: row.get("id"),
        name: row.get("name"),
        color: row.get("color"),
        slug: row.get("slug"),
    })
}

// ============================================================================
// PostgreSQL implementations
// ============================================================================

async fn create_tag_postgres(pool: &PgPool, tag: &Tag) -> Result<Tag> {
    let row = sqlx::query(
        r#"
        INSERT INTO tags (name, color, slug)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(&tag.name)
    .bind(&tag.color)
    .bind(&tag.slug)
    .fetch_one(pool)
    .await
    .context("Failed to create tag")?;

    Ok(Tag {
        id: row.get("id"),
        name: tag.name.clone(),
        color: tag.color.clone(),
        slug: tag.slug.clone(),
    })
}

async fn get_tag_by_id_postgres(pool: &PgPool, id: i64) -> Result<Option<Tag>> {
    let row = sqlx::query(
        r#"
        SELECT id, name, color, slug
        FROM tags
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get tag by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_tag_postgres(&row)?)),
        None => Ok(None),
    }
}

async fn get_tags_by_ids_postgres(pool: &PgPool, ids: &[i64]) -> Result<Vec<Tag>> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, color, slug
        FROM tags
        WHERE id = ANY($1)
        "#,
    )
    .bind(ids)
    .fetch_all(pool)
    .await
    .context("Failed to get tags by IDs")?;

    let mut tags = Vec::new();
    for row in rows {
        tags.push(row_to_tag_postgres(&row)?);
    }

    Ok(tags)
}

async fn get_tag_by_slug_postgres(pool: &PgPool, slug: &str) -> Result<Option<Tag>> {
    let row = sqlx::query(
        r#"
        SELECT id, name, color, slug
        FROM tags
        WHERE slug = $1
        "#,
    )
    .bind(slug)
    .fetch_optional(pool)
    .await
    .context("Failed to get tag by slug")?;

    match row {
        Some(row) => Ok(Some(row_to_tag_postgres(&row)?)),
        None => Ok(None),
    }
}

async fn list_tags_postgres(pool: &PgPool) -> Result<Vec<Tag>> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, color, slug
        FROM tags
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list tags")?;

    let mut tags = Vec::new();
    for row in rows {
        tags.push(row_to_tag_postgres(&row)?);
    }

    Ok(tags)
}

async fn get_tags_by_recipe_postgres(pool: &PgPool, recipe_id: i64) -> Result<Vec<Tag>> {
    let rows = sqlx::query(
        r#"
        SELECT t.id, t.name, t.color, t.slug
        FROM tags t
        INNER JOIN recipe_tags rt ON t.id = rt.tag_id
        WHERE rt.recipe_id = $1
        ORDER BY t.id
        "#,
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await
    .context("Failed to get tags by recipe")?;

    let mut tags = Vec::new();
    for row in rows {
        tags.push(row_to_tag_postgres(&row)?);
    }

    Ok(tags)
}

fn row_to_tag_postgres(row: &sqlx::postgres::PgRow) -> Result<Tag> {
    Ok(Tag {
        id: row.get("id"),
        name: row.get("name"),
        color: row.get("color"),
        slug: row.get("slug"),
    })
}
