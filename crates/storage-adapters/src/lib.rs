//! # storage-adapters
//!
//! SQLite implementations of the repository ports. Rows are mapped by hand
//! into the `domains` models; multi-statement writes (comment path
//! assignment, category attachment) run inside transactions.

pub mod schema;

mod accounts;
mod blogs;
mod categories;
mod comments;

pub use accounts::SqliteAccountRepo;
pub use blogs::SqliteBlogRepo;
pub use categories::SqliteCategoryRepo;
pub use comments::SqliteCommentRepo;

use std::str::FromStr;

use domains::{DomainError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

pub(crate) fn storage_err(error: sqlx::Error) -> DomainError {
    DomainError::Storage(error.to_string())
}

/// Open (or create) the database at `url`, enable foreign keys and apply the
/// schema before handing the pool out.
pub async fn connect(url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)
        .map_err(storage_err)?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .map_err(storage_err)?;
    tracing::info!(url, "database opened");
    schema::setup(&pool).await?;
    Ok(pool)
}

/// A private in-memory database for tests. Pinned to a single long-lived
/// connection: every `:memory:` connection is its own database.
pub async fn connect_in_memory() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .map_err(storage_err)?
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .map_err(storage_err)?;
    schema::setup(&pool).await?;
    Ok(pool)
}
