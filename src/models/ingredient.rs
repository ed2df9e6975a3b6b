//! Ingredient model
//!
//! Catalog entries recipes refer to. The catalog is seeded ahead of
//! recipe authoring and rarely changes afterwards.

use serde::{Deserialize, Serialize};

/// Ingredient entity: a canonical name plus its measurement unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ingredient {
    /// Unique identifier
    pub id: i64,
    /// Ingredient name
    pub name: String,
    /// Measurement unit the amount is expressed in ("g", "pcs", ...)
    pub measurement_unit: String,
}

impl Ingredient {
    /// Create a new Ingredient with the given parameters.
    ///
    /// The ID will be set to 0 and should be assigned by the database.
    pub fn new(name: String, measurement_unit: String) -> Self {
        Self {
            id: 0, // Will be set by the database
            name,
            measurement_unit,
        }
    }
}

/// One entry of a bulk catalog load, matching the seed-file layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Ingredient name
    pub name: String,
    /// Measurement unit
    pub measurement_unit: String,
}
