//! Schema migrations
//!
//! The schema grows as numbered SQL batches. Applied versions are recorded
//! in the `_migrations` table and anything newer runs on connect, so an
//! older database file picks up new tables the first time it is opened.

use anyhow::Context;
use sqlx::SqlitePool;

/// All schema batches in application order, with a short summary for the log
/// and the migration record.
const MIGRATIONS: [(i32, &str, &str); 3] = [
    (1, "recipe identity and version chains", MIGRATION_V1),
    (2, "cooking instances and photos", MIGRATION_V2),
    (3, "lineage and archival indexes", MIGRATION_V3),
];

/// Schema version a fully migrated database sits at.
pub const CURRENT_VERSION: i32 = MIGRATIONS[MIGRATIONS.len() - 1].0;

const CREATE_MIGRATIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS _migrations (
        version INTEGER PRIMARY KEY NOT NULL,
        name TEXT NOT NULL,
        applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
"#;

/// Migration 1: Recipes and their version chains
///
/// No cascading deletes anywhere: version rows must survive everything,
/// since cooking instances reference them forever.
const MIGRATION_V1: &str = r#"
    -- Recipe identity rows
    CREATE TABLE IF NOT EXISTS recipes (
        id TEXT PRIMARY KEY NOT NULL,
        current_version INTEGER NOT NULL DEFAULT 1,
        parent_recipe_id TEXT REFERENCES recipes(id),
        archived_at TIMESTAMP,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );

    -- Immutable version snapshots, one per edit
    CREATE TABLE IF NOT EXISTS recipe_versions (
        id TEXT PRIMARY KEY NOT NULL,
        recipe_id TEXT NOT NULL REFERENCES recipes(id),
        version INTEGER NOT NULL,
        title TEXT NOT NULL,
        description TEXT,
        ingredients TEXT NOT NULL,
        instructions TEXT NOT NULL,
        prep_time_mins INTEGER NOT NULL DEFAULT 0,
        cook_time_mins INTEGER NOT NULL DEFAULT 0,
        servings INTEGER NOT NULL,
        source_url TEXT,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        UNIQUE (recipe_id, version)
    );

    CREATE INDEX IF NOT EXISTS idx_recipe_versions_recipe_id ON recipe_versions(recipe_id);
"#;

/// Migration 2: Cooking instances
///
/// Photos live in a child table so appending one never rewrites the
/// captured instance row.
const MIGRATION_V2: &str = r#"
    -- Frozen records of individual cooking sessions
    CREATE TABLE IF NOT EXISTS recipe_instances (
        id TEXT PRIMARY KEY NOT NULL,
        recipe_id TEXT NOT NULL REFERENCES recipes(id),
        recipe_version INTEGER NOT NULL,
        scale_factor REAL NOT NULL DEFAULT 1.0,
        unit_system TEXT NOT NULL DEFAULT 'us' CHECK (unit_system IN ('us', 'metric')),
        servings INTEGER NOT NULL,
        notes TEXT,
        modifications TEXT NOT NULL DEFAULT '[]',
        cook_session_id TEXT,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );

    -- Append-only photo references
    CREATE TABLE IF NOT EXISTS instance_photos (
        id TEXT PRIMARY KEY NOT NULL,
        instance_id TEXT NOT NULL REFERENCES recipe_instances(id),
        photo_id TEXT NOT NULL,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );

    CREATE INDEX IF NOT EXISTS idx_instance_photos_instance_id ON instance_photos(instance_id);
"#;

/// Migration 3: Lineage and archival lookup indexes
const MIGRATION_V3: &str = r#"
    CREATE INDEX IF NOT EXISTS idx_recipes_parent_recipe_id ON recipes(parent_recipe_id);
    CREATE INDEX IF NOT EXISTS idx_recipes_archived_at ON recipes(archived_at);
    CREATE INDEX IF NOT EXISTS idx_recipe_instances_recipe_id ON recipe_instances(recipe_id);
"#;

/// Highest migration version recorded in the database, 0 when none have run.
async fn latest_applied(pool: &SqlitePool) -> anyhow::Result<i32> {
    sqlx::raw_sql(CREATE_MIGRATIONS_TABLE).execute(pool).await?;

    // MAX over an empty table is a single NULL row
    let latest: Option<i32> = sqlx::query_scalar("SELECT MAX(version) FROM _migrations")
        .fetch_one(pool)
        .await?;
    Ok(latest.unwrap_or(0))
}

/// Apply every schema batch newer than what the database has recorded.
pub async fn run_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    let applied = latest_applied(pool).await?;
    if applied >= CURRENT_VERSION {
        tracing::debug!(version = applied, "Schema is up to date");
        return Ok(());
    }

    for (version, summary, sql) in MIGRATIONS {
        if version <= applied {
            continue;
        }
        tracing::info!(version, "Applying schema migration: {}", summary);
        sqlx::raw_sql(sql)
            .execute(pool)
            .await
            .with_context(|| format!("Schema migration v{} failed", version))?;
        sqlx::query("INSERT INTO _migrations (version, name) VALUES (?, ?)")
            .bind(version)
            .bind(summary)
            .execute(pool)
            .await?;
    }

    tracing::info!(from = applied, to = CURRENT_VERSION, "Schema migrated");
    Ok(())
}

/// Where the database schema stands relative to this build.
pub async fn migration_status(pool: &SqlitePool) -> anyhow::Result<MigrationStatus> {
    let applied = latest_applied(pool).await?;
    Ok(MigrationStatus {
        current_version: applied,
        target_version: CURRENT_VERSION,
        needs_migration: applied < CURRENT_VERSION,
    })
}

#[derive(Debug, Clone, Copy)]
pub struct MigrationStatus {
    /// Highest migration the database has recorded
    pub current_version: i32,
    /// Version this build migrates to
    pub target_version: i32,
    pub needs_migration: bool,
}
