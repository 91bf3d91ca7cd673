//! Database layer
//!
//! SQLite is the default (single file next to the binary); MySQL is selected
//! through `database.driver`. Both are reached through the `DatabasePool`
//! trait so repositories stay backend-agnostic.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool, Backend, DatabasePool, DynDatabasePool};
