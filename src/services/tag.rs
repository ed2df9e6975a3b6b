//! Tag service
//!
//! Business logic for the tag catalog: validated creation and lookups.
//! Tags are operator-curated; recipes only reference them.

use crate::db::repositories::{is_unique_violation, TagRepository};
use crate::models::{CreateTagInput, Tag};
use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

/// Maximum length of tag names and slugs
const MAX_FIELD_LEN: usize = 200;

/// "#RRGGBB" with six hex digits
static COLOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap());

/// Letters, digits, hyphens and underscores only
static SLUG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").unwrap());

/// Error types for tag service operations
#[derive(Debug, thiserror::Error)]
pub enum TagServiceError {
    /// Tag not found
    #[error("Tag not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Name, color or slug already taken
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Tag service for catalog access
pub struct TagService {
    repo: Arc<dyn TagRepository>,
}

impl TagService {
    /// Create a new tag service
    pub fn new(repo: Arc<dyn TagRepository>) -> Self {
        Self { repo }
    }

    /// Create a new tag.
    ///
    /// # Errors
    /// - `ValidationError` on an empty/overlong name, malformed color
    ///   code or malformed slug
    /// - `Conflict` when the name, color or slug is already taken
    pub async fn create(&self, input: &CreateTagInput) -> Result<Tag, TagServiceError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(TagServiceError::ValidationError(
                "tag name cannot be empty".to_string(),
            ));
        }
        if name.chars().count() > MAX_FIELD_LEN {
            return Err(TagServiceError::ValidationError(format!(
                "tag name is longer than {} characters",
                MAX_FIELD_LEN
            )));
        }
        if let Some(color) = &input.color {
            if !COLOR_RE.is_match(color) {
                return Err(TagServiceError::ValidationError(format!(
                    "malformed hex color code: {}",
                    color
                )));
            }
        }
        if input.slug.is_empty() || input.slug.chars().count() > MAX_FIELD_LEN {
            return Err(TagServiceError::ValidationError(
                "tag slug must be between 1 and 200 characters".to_string(),
            ));
        }
        if !SLUG_RE.is_match(&input.slug) {
            return Err(TagServiceError::ValidationError(format!(
                "tag slug may only contain letters, digits, hyphens and underscores: {}",
                input.slug
            )));
        }

        let tag = Tag::new(name.to_string(), input.color.clone(), input.slug.clone());
        match self.repo.create(&tag).await {
            Ok(created) => Ok(created),
            Err(e) if is_unique_violation(&e) => Err(TagServiceError::Conflict(format!(
                "a tag with the same name, color or slug already exists: {}",
                name
            ))),
            Err(e) => Err(TagServiceError::InternalError(
                e.context("Failed to create tag"),
            )),
        }
    }

    /// Get tag by ID
    pub async fn get(&self, id: i64) -> Result<Tag, TagServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get tag")?
            .ok_or_else(|| TagServiceError::NotFound(format!("Tag with ID {} not found", id)))
    }

    /// Get tag by slug
    pub async fn get_by_slug(&self, slug: &str) -> Result<Tag, TagServiceError> {
        self.repo
            .get_by_slug(slug)
            .await
            .context("Failed to get tag by slug")?
            .ok_or_else(|| TagServiceError::NotFound(format!("Tag with slug '{}' not found", slug)))
    }

    /// List all tags
    pub async fn list(&self) -> Result<Vec<Tag>, TagServiceError> {
        self.repo
            .list()
            .await
            .context("Failed to list tags")
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxTagRepository;
    use crate::db::{create_test_pool, migrations, DynDatabasePool};

    async fn setup_test_service() -> (DynDatabasePool, TagService) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let service = TagService::new(SqlxTagRepository::boxed(pool.clone()));
        (pool, service)
    }

    fn input(name: &str, color: Option<&str>, slug: &str) -> CreateTagInput {
        CreateTagInput {
            name: name.to_string(),
            color: color.map(str::to_string),
            slug: slug.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_tag() {
        let (_pool, service) = setup_test_service().await;

        let tag = service
            .create(&input("Breakfast", Some("#49B64E"), "breakfast"))
            .await
            .expect("Failed to create tag");

        assert!(tag.id > 0);
        assert_eq!(tag.name, "Breakfast");
    }

    #[tokio::test]
    async fn test_create_empty_name_fails() {
        let (_pool, service) = setup_test_service().await;

        let result = service.create(&input("  ", None, "breakfast")).await;
        assert!(matches!(result, Err(TagServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_create_malformed_color_fails() {
        let (_pool, service) = setup_test_service().await;

        for color in ["49B64E", "#49B64", "#49B64EFF", "#GGGGGG"] {
            let result = service.create(&input("Breakfast", Some(color), "breakfast")).await;
            assert!(
                matches!(result, Err(TagServiceError::ValidationError(_))),
                "color {} should be rejected",
                color
            );
        }
    }

    #[tokio::test]
    async fn test_create_malformed_slug_fails() {
        let (_pool, service) = setup_test_service().await;

        for slug in ["with space", "ünïcode", "semi;colon", ""] {
            let result = service.create(&input("Breakfast", None, slug)).await;
            assert!(
                matches!(result, Err(TagServiceError::ValidationError(_))),
                "slug {:?} should be rejected",
                slug
            );
        }
    }

    #[tokio::test]
    async fn test_create_duplicate_is_conflict() {
        let (_pool, service) = setup_test_service().await;

        service
            .create(&input("Breakfast", None, "breakfast"))
            .await
            .expect("Failed to create tag");

        let result = service.create(&input("Breakfast", None, "breakfast-2")).await;
        assert!(matches!(result, Err(TagServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_get_by_slug() {
        let (_pool, service) = setup_test_service().await;
        service
            .create(&input("Breakfast", None, "breakfast"))
            .await
            .expect("Failed to create tag");

        let tag = service
            .get_by_slug("breakfast")
            .await
            .expect("Failed to get tag");
        assert_eq!(tag.name, "Breakfast");

        let missing = service.get_by_slug("lunch").await;
        assert!(matches!(missing, Err(TagServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_keeps_catalog_order() {
        let (_pool, service) = setup_test_service().await;

        service.create(&input("Zebra", None, "zebra")).await.unwrap();
        service.create(&input("Apple", None, "apple")).await.unwrap();

        let tags = service.list().await.expect("Failed to list tags");
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].name, "Zebra");
        assert_eq!(tags[1].name, "Apple");
    }
}
