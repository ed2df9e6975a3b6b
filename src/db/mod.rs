//! Database layer
//!
//! Storage abstraction for the Mealshare data core:
//! - SQLite (default, for single-binary deployment and tests)
//! - PostgreSQL (for shared deployments)
//!
//! The driver is selected via configuration. Repositories dispatch on
//! the `DatabasePool` trait so callers never see a concrete backend.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{
    create_pool, create_test_pool, DatabasePool, DynDatabasePool, PostgresDatabase, SqliteDatabase,
};
