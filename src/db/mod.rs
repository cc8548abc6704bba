//! Store access.
//!
//! The pool is the only shared state of the application. Schema changes ship as
//! embedded migrations under `migrations/`; repository functions live in submodules
//! and take the pool explicitly.

pub mod tasks;

use std::str::FromStr;

use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::error::AppError;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Dropped, children first, when the store is reset.
const RESET_TABLES: &[&str] = &["tasks", "users", "_sqlx_migrations"];

/// Builds a pool that connects on first use.
///
/// Nothing touches the store here, so a missing or unreadable database file surfaces
/// during [`initialize`] where it is logged instead of aborting startup.
pub fn connect(database_url: &str) -> Result<SqlitePool, AppError> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    Ok(SqlitePoolOptions::new()
        .max_connections(5)
        .connect_lazy_with(options))
}

/// Brings the schema up to date. With `reset` every table is dropped first, which
/// wipes all accounts and tasks.
pub async fn initialize(pool: &SqlitePool, reset: bool) -> Result<(), AppError> {
    if reset {
        log::warn!("Resetting database: all tables will be dropped");
        for table in RESET_TABLES {
            sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
                .execute(pool)
                .await?;
        }
    }

    MIGRATOR.run(pool).await?;
    Ok(())
}
