//! SQLite pool construction and schema migration.
//!
//! The database file (and its parent directory) is created on first run.
//! Migration SQL is embedded at compile time and every statement is written
//! with `IF NOT EXISTS`, so running it on each startup is harmless.

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};
use std::{fs, io, path::Path, str::FromStr, time::Duration};
use thiserror::Error;

const INIT_SQL: &str = include_str!("../migrations/0001_init.sql");

/// Default pool size. Writes are serialized by SQLite itself.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// How long a connection waits for the write lock before giving up.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

/// Statement opening a transaction that will write.
///
/// Takes the write lock up front so that read-then-write transactions queue
/// on `BUSY_TIMEOUT` instead of failing to upgrade a shared lock.
pub const BEGIN_WRITE: &str = "BEGIN IMMEDIATE";

#[derive(Debug, Error)]
pub enum DbError {
    #[error("could not prepare database directory {path}: {source}")]
    Directory { path: String, source: io::Error },
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Open a pool for `database_url`, creating the file if it is missing.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, DbError> {
    if let Some(path) = file_path(database_url) {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| DbError::Directory {
                    path: parent.display().to_string(),
                    source,
                })?;
                tracing::info!("Created database directory {}", parent.display());
            }
        }
    }

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// A private in-memory database on a single, never-recycled connection.
pub async fn connect_in_memory() -> Result<SqlitePool, DbError> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None::<Duration>)
        .max_lifetime(None::<Duration>)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Apply the embedded schema, one statement at a time.
pub async fn run_migrations(db: &SqlitePool) -> Result<(), DbError> {
    let statements = INIT_SQL
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>();

    tracing::info!("Running {} migration statements...", statements.len());

    for stmt in statements {
        tracing::debug!("Executing migration SQL: {}", stmt);
        sqlx::query(stmt).execute(db).await?;
    }

    Ok(())
}

/// Local file path behind a `sqlite:` URL, or `None` for in-memory databases.
fn file_path(database_url: &str) -> Option<&Path> {
    let rest = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .trim_start_matches("file:");
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() || path.starts_with(":memory:") {
        None
    } else {
        Some(Path::new(path))
    }
}
