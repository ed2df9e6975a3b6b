//! Ingredient service
//!
//! Business logic for the ingredient catalog: listing, case-insensitive
//! prefix search and bulk seeding from catalog files.

use crate::db::repositories::IngredientRepository;
use crate::models::{CatalogEntry, Ingredient};
use anyhow::Context;
use std::sync::Arc;

/// Maximum length of ingredient names and measurement units
const MAX_FIELD_LEN: usize = 200;

/// Error types for ingredient service operations
#[derive(Debug, thiserror::Error)]
pub enum IngredientServiceError {
    /// Ingredient not found
    #[error("Ingredient not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Ingredient service for catalog access
pub struct IngredientService {
    repo: Arc<dyn IngredientRepository>,
}

impl IngredientService {
    /// Create a new ingredient service
    pub fn new(repo: Arc<dyn IngredientRepository>) -> Self {
        Self { repo }
    }

    /// Add a single ingredient to the catalog
    pub async fn create(
        &self,
        name: &str,
        measurement_unit: &str,
    ) -> Result<Ingredient, IngredientServiceError> {
        let name = name.trim();
        let unit = measurement_unit.trim();
        validate_entry(name, unit)?;

        let created = self
            .repo
            .create(&Ingredient::new(name.to_string(), unit.to_string()))
            .await
            .context("Failed to create ingredient")?;

        Ok(created)
    }

    /// Bulk-load catalog entries, e.g. from a seed file.
    ///
    /// All entries are validated up front and inserted in one
    /// transaction; a bad entry rejects the whole batch.
    pub async fn load_catalog(
        &self,
        entries: &[CatalogEntry],
    ) -> Result<usize, IngredientServiceError> {
        for (index, entry) in entries.iter().enumerate() {
            validate_entry(entry.name.trim(), entry.measurement_unit.trim()).map_err(|e| {
                IngredientServiceError::ValidationError(format!("entry {}: {}", index, e))
            })?;
        }

        let inserted = self
            .repo
            .create_many(entries)
            .await
            .context("Failed to load ingredient catalog")?;

        tracing::info!("Loaded {} catalog entries", inserted);
        Ok(inserted)
    }

    /// Get an ingredient by ID
    pub async fn get(&self, id: i64) -> Result<Ingredient, IngredientServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get ingredient")?
            .ok_or_else(|| {
                IngredientServiceError::NotFound(format!("Ingredient with ID {} not found", id))
            })
    }

    /// List all ingredients, ordered by name
    pub async fn list(&self) -> Result<Vec<Ingredient>, IngredientServiceError> {
        self.repo
            .list()
            .await
            .context("Failed to list ingredients")
            .map_err(Into::into)
    }

    /// Search ingredients by case-insensitive name prefix.
    ///
    /// An empty prefix matches the whole catalog.
    pub async fn search(&self, prefix: &str) -> Result<Vec<Ingredient>, IngredientServiceError> {
        self.repo
            .search_by_prefix(prefix.trim())
            .await
            .context("Failed to search ingredients")
            .map_err(Into::into)
    }
}

fn validate_entry(name: &str, unit: &str) -> Result<(), IngredientServiceError> {
    if name.is_empty() {
        return Err(IngredientServiceError::ValidationError(
            "ingredient name cannot be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_FIELD_LEN {
        return Err(IngredientServiceError::ValidationError(format!(
            "ingredient name is longer than {} characters",
            MAX_FIELD_LEN
        )));
    }
    if unit.is_empty() {
        return Err(IngredientServiceError::ValidationError(
            "measurement unit cannot be empty".to_string(),
        ));
    }
    if unit.chars().count() > MAX_FIELD_LEN {
        return Err(IngredientServiceError::ValidationError(format!(
            "measurement unit is longer than {} characters",
            MAX_FIELD_LEN
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxIngredientRepository;
    use crate::db::{create_test_pool, migrations, DynDatabasePool};

    async fn setup_test_service() -> (DynDatabasePool, IngredientService) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let service = IngredientService::new(SqlxIngredientRepository::boxed(pool.clone()));
        (pool, service)
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (_pool, service) = setup_test_service().await;

        let created = service
            .create("Flour", "g")
            .await
            .expect("Failed to create ingredient");
        assert!(created.id > 0);

        let fetched = service.get(created.id).await.expect("Failed to get");
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_create_trims_whitespace() {
        let (_pool, service) = setup_test_service().await;

        let created = service
            .create("  Flour  ", " g ")
            .await
            .expect("Failed to create ingredient");
        assert_eq!(created.name, "Flour");
        assert_eq!(created.measurement_unit, "g");
    }

    #[tokio::test]
    async fn test_create_empty_name_fails() {
        let (_pool, service) = setup_test_service().await;

        let result = service.create("   ", "g").await;
        assert!(matches!(
            result,
            Err(IngredientServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_create_overlong_name_fails() {
        let (_pool, service) = setup_test_service().await;

        let result = service.create(&"x".repeat(201), "g").await;
        assert!(matches!(
            result,
            Err(IngredientServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let (_pool, service) = setup_test_service().await;

        let result = service.get(999).await;
        assert!(matches!(result, Err(IngredientServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_load_catalog() {
        let (_pool, service) = setup_test_service().await;

        let entries = vec![
            CatalogEntry {
                name: "Молоко".to_string(),
                measurement_unit: "мл".to_string(),
            },
            CatalogEntry {
                name: "Кефир".to_string(),
                measurement_unit: "мл".to_string(),
            },
        ];

        let inserted = service
            .load_catalog(&entries)
            .await
            .expect("Failed to load catalog");
        assert_eq!(inserted, 2);
    }

    #[tokio::test]
    async fn test_load_catalog_rejects_bad_entry() {
        let (_pool, service) = setup_test_service().await;

        let entries = vec![
            CatalogEntry {
                name: "Milk".to_string(),
                measurement_unit: "ml".to_string(),
            },
            CatalogEntry {
                name: "".to_string(),
                measurement_unit: "g".to_string(),
            },
        ];

        let result = service.load_catalog(&entries).await;
        assert!(matches!(
            result,
            Err(IngredientServiceError::ValidationError(_))
        ));

        // Nothing from the batch may have been inserted
        let all = service.list().await.expect("Failed to list");
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn test_search_prefix_matches_cyrillic() {
        let (_pool, service) = setup_test_service().await;

        service
            .load_catalog(&[
                CatalogEntry {
                    name: "Молоко".to_string(),
                    measurement_unit: "мл".to_string(),
                },
                CatalogEntry {
                    name: "Кефир".to_string(),
                    measurement_unit: "мл".to_string(),
                },
            ])
            .await
            .expect("Failed to load catalog");

        let found = service.search("мол").await.expect("Failed to search");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Молоко");
    }

    #[tokio::test]
    async fn test_search_empty_prefix_returns_all() {
        let (_pool, service) = setup_test_service().await;

        service.create("Flour", "g").await.unwrap();
        service.create("Egg", "pcs").await.unwrap();

        let found = service.search("").await.expect("Failed to search");
        assert_eq!(found.len(), 2);
    }
}
