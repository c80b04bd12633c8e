//! Store connection
//!
//! The upstream bibliographic store must already exist; a run never creates
//! an empty database to read from.

use crate::{Error, Result};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Access needed by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    /// Schema checks and inspection only
    ReadOnly,
    /// Full run: inputs are read, output tables rebuilt
    ReadWrite,
}

/// Open an existing SQLite store
pub async fn open_store(db_path: &Path, mode: StoreMode) -> Result<SqlitePool> {
    if !db_path.exists() {
        return Err(Error::Config(format!(
            "Database not found: {}",
            db_path.display()
        )));
    }

    let db_url = match mode {
        StoreMode::ReadOnly => format!("sqlite://{}?mode=ro", db_path.display()),
        StoreMode::ReadWrite => format!("sqlite://{}?mode=rw", db_path.display()),
    };

    // Single writer: stages run sequentially
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&db_url)
        .await?;

    if mode == StoreMode::ReadWrite {
        sqlx::query("PRAGMA busy_timeout = 5000")
            .execute(&pool)
            .await?;
    }

    info!("Opened database ({:?}): {}", mode, db_path.display());

    Ok(pool)
}
