//! Tag model
//!
//! Fixed classification labels attached to recipes. Tags are catalog
//! data: created by an operator, referenced many-to-many by recipes.

use serde::{Deserialize, Serialize};

/// Tag entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tag {
    /// Unique identifier
    pub id: i64,
    /// Tag name (unique)
    pub name: String,
    /// Optional hex color code, "#RRGGBB" (unique when present)
    pub color: Option<String>,
    /// URL-friendly slug (unique)
    pub slug: String,
}

impl Tag {
    /// Create a new Tag with the given parameters.
    ///
    /// The ID will be set to 0 and should be assigned by the database.
    pub fn new(name: String, color: Option<String>, slug: String) -> Self {
        Self {
            id: 0, // Will be set by the database
            name,
            color,
            slug,
        }
    }
}

/// Input for creating a new tag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTagInput {
    /// Tag name
    pub name: String,
    /// Optional hex color code, "#RRGGBB"
    pub color: Option<String>,
    /// URL-friendly slug
    pub slug: String,
}
