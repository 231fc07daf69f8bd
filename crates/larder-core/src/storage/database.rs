//! SQLite storage
//!
//! Everything larder persists lives in a single SQLite file. This module
//! owns the connection pool and applies pending schema migrations when the
//! file is opened.

use crate::storage::migrations;
use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// How to open the database.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// File to open, or `:memory:` for a throwaway database
    pub path: PathBuf,
    /// Pool size cap
    pub max_connections: u32,
    /// Apply pending schema migrations on open
    pub auto_migrate: bool,
    /// Journal mode, WAL by default
    pub journal_mode: SqliteJournalMode,
    /// Synchronous level, NORMAL by default
    pub synchronous: SqliteSynchronous,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            auto_migrate: true,
            journal_mode: SqliteJournalMode::Wal,
            synchronous: SqliteSynchronous::Normal,
        }
    }
}

impl DatabaseConfig {
    /// Config for the database file at `path`.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Config for a private in-memory database.
    ///
    /// Capped at one connection: sqlite hands every new connection its own
    /// empty `:memory:` database.
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::from(":memory:"),
            max_connections: 1,
            ..Default::default()
        }
    }

    /// Set the pool size cap.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Leave the schema alone on open.
    pub fn no_migrate(mut self) -> Self {
        self.auto_migrate = false;
        self
    }
}

/// Where the database file lives by default.
///
/// `LARDER_DB` overrides the platform config directory, so tests and
/// scripts can point at a throwaway file.
pub fn default_database_path() -> PathBuf {
    if let Ok(path) = std::env::var("LARDER_DB") {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .map(|dir| dir.join("larder").join("larder.db"))
        .unwrap_or_else(|| PathBuf::from("larder.db"))
}

/// Open connection pool plus the config it was opened with.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    config: DatabaseConfig,
}

impl Database {
    /// Open the database described by `config`, creating the file and its
    /// directory if needed.
    pub async fn new(config: DatabaseConfig) -> Result<Self> {
        let in_memory = config.path.as_os_str() == ":memory:";
        if !in_memory {
            // parent() of a bare filename is the empty path
            let parent = config.path.parent().filter(|p| !p.as_os_str().is_empty());
            if let Some(parent) = parent {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory: {:?}", parent)
                })?;
            }
        }

        // foreign_keys is a per-connection pragma, setting it here covers
        // every connection the pool opens
        let connect_options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true)
            .journal_mode(config.journal_mode)
            .synchronous(config.synchronous)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(connect_options)
            .await
            .with_context(|| format!("Failed to open database at {:?}", config.path))?;

        let db = Self { pool, config };
        if db.config.auto_migrate {
            db.migrate().await?;
        }
        Ok(db)
    }

    /// Open a fresh in-memory database, migrated and ready. Test harnesses
    /// lean on this.
    pub async fn in_memory() -> Result<Self> {
        Self::new(DatabaseConfig::in_memory()).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Apply any schema migrations the file is missing.
    pub async fn migrate(&self) -> Result<()> {
        migrations::run_migrations(&self.pool)
            .await
            .context("Failed to migrate database schema")
    }

    /// Report where the schema stands relative to this build.
    pub async fn migration_status(&self) -> Result<migrations::MigrationStatus> {
        migrations::migration_status(&self.pool)
            .await
            .context("Failed to read schema version")
    }

    /// Round-trip a trivial query to prove the connection works.
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("Database health check failed")?;
        Ok(())
    }

    /// Close the pool, flushing WAL state.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Path of the open database file.
    pub fn path(&self) -> &Path {
        &self.config.path
    }
}
