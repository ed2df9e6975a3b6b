//! Shopping list model
//!
//! The derived report produced by aggregating a user's cart. Amounts
//! for the same (name, unit) pair are summed across every recipe in
//! the cart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One aggregated ingredient line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShoppingListItem {
    /// Ingredient name
    pub name: String,
    /// Measurement unit
    pub measurement_unit: String,
    /// Summed amount across all cart recipes
    pub total_amount: i64,
}

/// A user's aggregated shopping list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingList {
    /// Username of the requesting user
    pub username: String,
    /// Display name of the requesting user
    pub display_name: String,
    /// Generation timestamp
    pub generated_at: DateTime<Utc>,
    /// Aggregated lines, ordered by ingredient name
    pub items: Vec<ShoppingListItem>,
}
