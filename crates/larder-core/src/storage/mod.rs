//! SQLite persistence
//!
//! `database` opens and pools the single larder.db file; `migrations`
//! carries the schema forward version by version. The domain repositories
//! sit on top of the pool these two hand out.
//!
//! ```ignore
//! use larder_core::storage::{Database, DatabaseConfig};
//!
//! // Throwaway database for tests
//! let db = Database::in_memory().await?;
//!
//! // The real file at a configured path
//! let db = Database::new(DatabaseConfig::with_path(path)).await?;
//! ```

pub mod database;
pub mod migrations;

pub use database::{default_database_path, Database, DatabaseConfig};
pub use migrations::{migration_status, run_migrations, MigrationStatus, CURRENT_VERSION};
