//! Database pool management.
//!
//! The pool is initialized once at startup and reached through
//! [`get_db_pool`] from anywhere in the crate.

use once_cell::sync::OnceCell;
use sea_orm::{Database, DatabaseConnection};

static DB_POOL: OnceCell<DatabaseConnection> = OnceCell::new();

/// Connect to the database and store the pool globally.
/// Panics
pub async fn init_db(database_url: String) {
    let pool = Database::connect(&database_url)
        .await
        .expect("Failed to connect to the database.");

    DB_POOL
        .set(pool)
        .expect("init_db() called more than once.");
}

/// Returns the global connection pool.
/// Panics if [`init_db`] has not run.
pub fn get_db_pool() -> &'static DatabaseConnection {
    DB_POOL.get().expect("Database pool is not initialized.")
}
