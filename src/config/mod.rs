//! Configuration management
//!
//! Loads configuration for the Mealshare data core from:
//! - a mealshare.toml file
//! - environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Shopping list rendering configuration
    #[serde(default)]
    pub shopping_list: ShoppingListConfig,
}

impl Config {
    /// Load configuration from a TOML file, then apply environment
    /// variable overrides.
    ///
    /// A missing file is not an error: defaults are used.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str(&raw)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Config::default()
        };

        config.apply_env();
        Ok(config)
    }

    /// Apply environment variable overrides:
    /// - `MEALSHARE_DATABASE_DRIVER` ("sqlite" or "postgres")
    /// - `MEALSHARE_DATABASE_URL`
    pub fn apply_env(&mut self) {
        if let Ok(driver) = std::env::var("MEALSHARE_DATABASE_DRIVER") {
            match driver.to_lowercase().as_str() {
                "sqlite" => self.database.driver = DatabaseDriver::Sqlite,
                "postgres" | "postgresql" => self.database.driver = DatabaseDriver::Postgres,
                other => {
                    tracing::warn!("Ignoring unknown MEALSHARE_DATABASE_DRIVER: {}", other);
                }
            }
        }
        if let Ok(url) = std::env::var("MEALSHARE_DATABASE_URL") {
            self.database.url = url;
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database driver (sqlite or postgres)
    #[serde(default)]
    pub driver: DatabaseDriver,
    /// Database connection URL
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: DatabaseDriver::default(),
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data/mealshare.db".to_string()
}

/// Database driver type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseDriver {
    /// SQLite (default, single-binary deployment and tests)
    #[default]
    Sqlite,
    /// PostgreSQL
    Postgres,
}

/// Shopping list rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingListConfig {
    /// Footer line appended to every generated shopping list
    #[serde(default = "default_footer")]
    pub footer: String,
}

impl Default for ShoppingListConfig {
    fn default() -> Self {
        Self {
            footer: default_footer(),
        }
    }
}

fn default_footer() -> String {
    "Generated by the Mealshare grocery assistant".to_string()
}
