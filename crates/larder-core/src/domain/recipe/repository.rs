//! Recipe repository for database operations
//!
//! Handles all database interactions for recipe identity rows and their
//! version snapshots. Version rows are insert-only; nothing here can
//! update or delete one.

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use super::recipe::{Recipe, RecipeDraft, RecipeSummary, RecipeVersion};
use crate::error::{Error, Result};

/// Repository for recipe database operations
#[derive(Debug, Clone)]
pub struct RecipeRepository {
    pool: SqlitePool,
}

impl RecipeRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // ========== Recipes ==========

    /// Insert a recipe identity together with its first version
    ///
    /// Both rows land in one transaction; a recipe without version 1
    /// must never be observable.
    pub async fn create_with_version(
        &self,
        recipe: &Recipe,
        version: &RecipeVersion,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::DatabaseError)?;

        insert_recipe(&mut tx, recipe).await?;
        insert_version(&mut tx, version).await?;

        tx.commit().await.map_err(Error::DatabaseError)?;
        Ok(())
    }

    /// Get a recipe identity by ID
    pub async fn get_recipe(&self, recipe_id: Uuid) -> Result<Option<Recipe>> {
        let row: Option<RecipeRow> = sqlx::query_as(
            r#"
            SELECT id, current_version, parent_recipe_id, archived_at, created_at
            FROM recipes
            WHERE id = ?
            "#,
        )
        .bind(recipe_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::DatabaseError)?;

        match row {
            Some(row) => Ok(Some(row.into_recipe()?)),
            None => Ok(None),
        }
    }

    /// List recipes that have not been archived, oldest first
    pub async fn list_active_recipes(&self) -> Result<Vec<Recipe>> {
        let rows: Vec<RecipeRow> = sqlx::query_as(
            r#"
            SELECT id, current_version, parent_recipe_id, archived_at, created_at
            FROM recipes
            WHERE archived_at IS NULL
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::DatabaseError)?;

        rows.into_iter().map(|row| row.into_recipe()).collect()
    }

    /// List every recipe including archived ones, oldest first
    pub async fn list_all_recipes(&self) -> Result<Vec<Recipe>> {
        let rows: Vec<RecipeRow> = sqlx::query_as(
            r#"
            SELECT id, current_version, parent_recipe_id, archived_at, created_at
            FROM recipes
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::DatabaseError)?;

        rows.into_iter().map(|row| row.into_recipe()).collect()
    }

    /// List recipes duplicated from the given recipe, oldest first
    pub async fn list_children(&self, recipe_id: Uuid) -> Result<Vec<Recipe>> {
        let rows: Vec<RecipeRow> = sqlx::query_as(
            r#"
            SELECT id, current_version, parent_recipe_id, archived_at, created_at
            FROM recipes
            WHERE parent_recipe_id = ?
            ORDER BY created_at ASC
            "#,
        )
        .bind(recipe_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::DatabaseError)?;

        rows.into_iter().map(|row| row.into_recipe()).collect()
    }

    /// List recipes with their current titles, oldest first
    pub async fn list_summaries(&self, include_archived: bool) -> Result<Vec<RecipeSummary>> {
        let sql = if include_archived {
            r#"
            SELECT r.id, v.title, r.current_version, r.parent_recipe_id,
                   r.archived_at, r.created_at
            FROM recipes r
            JOIN recipe_versions v
              ON v.recipe_id = r.id AND v.version = r.current_version
            ORDER BY r.created_at ASC
            "#
        } else {
            r#"
            SELECT r.id, v.title, r.current_version, r.parent_recipe_id,
                   r.archived_at, r.created_at
            FROM recipes r
            JOIN recipe_versions v
              ON v.recipe_id = r.id AND v.version = r.current_version
            WHERE r.archived_at IS NULL
            ORDER BY r.created_at ASC
            "#
        };

        let rows: Vec<RecipeSummaryRow> = sqlx::query_as(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::DatabaseError)?;

        rows.into_iter().map(|row| row.into_summary()).collect()
    }

    /// Stamp a recipe's archived_at timestamp
    ///
    /// Returns false when no such recipe exists. Touches nothing else;
    /// versions, instances and heritage links all stay.
    pub async fn set_archived(&self, recipe_id: Uuid, archived_at: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE recipes SET archived_at = ? WHERE id = ?
            "#,
        )
        .bind(archived_at)
        .bind(recipe_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(Error::DatabaseError)?;

        Ok(result.rows_affected() > 0)
    }

    /// Count all recipes
    pub async fn count_recipes(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipes")
            .fetch_one(&self.pool)
            .await
            .map_err(Error::DatabaseError)?;
        Ok(count)
    }

    // ========== Versions ==========

    /// Append the next version of a recipe inside one transaction
    ///
    /// Reads `current_version` inside the same transaction that writes
    /// the new snapshot and moves the pointer, so two concurrent edits
    /// cannot both land on the same version number. With
    /// `expected_version` set, the append fails with a conflict instead
    /// of silently building on an edit the caller never saw.
    pub async fn append_version(
        &self,
        recipe_id: Uuid,
        expected_version: Option<i64>,
        draft: &RecipeDraft,
    ) -> Result<RecipeVersion> {
        let mut tx = self.pool.begin().await.map_err(Error::DatabaseError)?;

        let current: Option<i64> =
            sqlx::query_scalar("SELECT current_version FROM recipes WHERE id = ?")
                .bind(recipe_id.to_string())
                .fetch_optional(&mut *tx)
                .await
                .map_err(Error::DatabaseError)?;

        let current = match current {
            Some(v) => v,
            None => return Err(Error::RecipeNotFound(recipe_id.to_string())),
        };

        if let Some(expected) = expected_version {
            if expected != current {
                return Err(Error::VersionConflict {
                    expected,
                    actual: current,
                });
            }
        }

        let version = RecipeVersion::from_draft(recipe_id, current + 1, draft);
        insert_version(&mut tx, &version).await?;

        sqlx::query("UPDATE recipes SET current_version = ? WHERE id = ?")
            .bind(version.version)
            .bind(recipe_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(Error::DatabaseError)?;

        tx.commit().await.map_err(Error::DatabaseError)?;
        Ok(version)
    }

    /// Get a specific version of a recipe
    pub async fn get_version(
        &self,
        recipe_id: Uuid,
        version: i64,
    ) -> Result<Option<RecipeVersion>> {
        let row: Option<RecipeVersionRow> = sqlx::query_as(
            r#"
            SELECT id, recipe_id, version, title, description,
                   ingredients, instructions,
                   prep_time_mins, cook_time_mins, servings,
                   source_url, created_at
            FROM recipe_versions
            WHERE recipe_id = ? AND version = ?
            "#,
        )
        .bind(recipe_id.to_string())
        .bind(version)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::DatabaseError)?;

        match row {
            Some(row) => Ok(Some(row.into_version()?)),
            None => Ok(None),
        }
    }

    /// Get the version the recipe's current_version pointer names
    pub async fn get_current_version(&self, recipe_id: Uuid) -> Result<Option<RecipeVersion>> {
        let row: Option<RecipeVersionRow> = sqlx::query_as(
            r#"
            SELECT v.id, v.recipe_id, v.version, v.title, v.description,
                   v.ingredients, v.instructions,
                   v.prep_time_mins, v.cook_time_mins, v.servings,
                   v.source_url, v.created_at
            FROM recipe_versions v
            JOIN recipes r ON r.id = v.recipe_id AND r.current_version = v.version
            WHERE r.id = ?
            "#,
        )
        .bind(recipe_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::DatabaseError)?;

        match row {
            Some(row) => Ok(Some(row.into_version()?)),
            None => Ok(None),
        }
    }

    /// List every version of a recipe, earliest first
    pub async fn list_versions(&self, recipe_id: Uuid) -> Result<Vec<RecipeVersion>> {
        let rows: Vec<RecipeVersionRow> = sqlx::query_as(
            r#"
            SELECT id, recipe_id, version, title, description,
                   ingredients, instructions,
                   prep_time_mins, cook_time_mins, servings,
                   source_url, created_at
            FROM recipe_versions
            WHERE recipe_id = ?
            ORDER BY version ASC
            "#,
        )
        .bind(recipe_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::DatabaseError)?;

        rows.into_iter().map(|row| row.into_version()).collect()
    }

    /// Count all version rows
    pub async fn count_versions(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipe_versions")
            .fetch_one(&self.pool)
            .await
            .map_err(Error::DatabaseError)?;
        Ok(count)
    }
}

async fn insert_recipe(tx: &mut Transaction<'_, Sqlite>, recipe: &Recipe) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO recipes (id, current_version, parent_recipe_id, archived_at, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(recipe.id.to_string())
    .bind(recipe.current_version)
    .bind(recipe.parent_recipe_id.map(|p| p.to_string()))
    .bind(recipe.archived_at)
    .bind(recipe.created_at)
    .execute(&mut **tx)
    .await
    .map_err(Error::DatabaseError)?;

    Ok(())
}

async fn insert_version(tx: &mut Transaction<'_, Sqlite>, version: &RecipeVersion) -> Result<()> {
    let ingredients = serde_json::to_string(&version.ingredients)
        .map_err(|e| Error::Parse(format!("Could not encode ingredients: {}", e)))?;
    let instructions = serde_json::to_string(&version.instructions)
        .map_err(|e| Error::Parse(format!("Could not encode instructions: {}", e)))?;

    sqlx::query(
        r#"
        INSERT INTO recipe_versions (
            id, recipe_id, version, title, description,
            ingredients, instructions,
            prep_time_mins, cook_time_mins, servings,
            source_url, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(version.id.to_string())
    .bind(version.recipe_id.to_string())
    .bind(version.version)
    .bind(&version.title)
    .bind(&version.description)
    .bind(&ingredients)
    .bind(&instructions)
    .bind(version.prep_time_mins)
    .bind(version.cook_time_mins)
    .bind(version.servings)
    .bind(&version.source_url)
    .bind(version.created_at)
    .execute(&mut **tx)
    .await
    .map_err(Error::DatabaseError)?;

    Ok(())
}

/// Database row for a recipe identity
#[derive(sqlx::FromRow)]
struct RecipeRow {
    id: String,
    current_version: i64,
    parent_recipe_id: Option<String>,
    archived_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl RecipeRow {
    fn into_recipe(self) -> Result<Recipe> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| Error::Parse(format!("Invalid recipe ID: {}", e)))?;
        let parent_recipe_id = self
            .parent_recipe_id
            .map(|p| Uuid::parse_str(&p))
            .transpose()
            .map_err(|e| Error::Parse(format!("Invalid parent recipe ID: {}", e)))?;

        Ok(Recipe {
            id,
            current_version: self.current_version,
            parent_recipe_id,
            archived_at: self.archived_at,
            created_at: self.created_at,
        })
    }
}

/// Database row for a version snapshot
#[derive(sqlx::FromRow)]
struct RecipeVersionRow {
    id: String,
    recipe_id: String,
    version: i64,
    title: String,
    description: Option<String>,
    ingredients: String,
    instructions: String,
    prep_time_mins: i64,
    cook_time_mins: i64,
    servings: i64,
    source_url: Option<String>,
    created_at: DateTime<Utc>,
}

impl RecipeVersionRow {
    fn into_version(self) -> Result<RecipeVersion> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| Error::Parse(format!("Invalid version ID: {}", e)))?;
        let recipe_id = Uuid::parse_str(&self.recipe_id)
            .map_err(|e| Error::Parse(format!("Invalid recipe ID: {}", e)))?;
        let ingredients = serde_json::from_str(&self.ingredients)
            .map_err(|e| Error::Parse(format!("Invalid ingredients JSON: {}", e)))?;
        let instructions = serde_json::from_str(&self.instructions)
            .map_err(|e| Error::Parse(format!("Invalid instructions JSON: {}", e)))?;

        Ok(RecipeVersion {
            id,
            recipe_id,
            version: self.version,
            title: self.title,
            description: self.description,
            ingredients,
            instructions,
            prep_time_mins: self.prep_time_mins,
            cook_time_mins: self.cook_time_mins,
            servings: self.servings,
            source_url: self.source_url,
            created_at: self.created_at,
        })
    }
}

/// Database row for a recipe listing
#[derive(sqlx::FromRow)]
struct RecipeSummaryRow {
    id: String,
    title: String,
    current_version: i64,
    parent_recipe_id: Option<String>,
    archived_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl RecipeSummaryRow {
    fn into_summary(self) -> Result<RecipeSummary> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| Error::Parse(format!("Invalid recipe ID: {}", e)))?;
        let parent_recipe_id = self
            .parent_recipe_id
            .map(|p| Uuid::parse_str(&p))
            .transpose()
            .map_err(|e| Error::Parse(format!("Invalid parent recipe ID: {}", e)))?;

        Ok(RecipeSummary {
            id,
            title: self.title,
            current_version: self.current_version,
            parent_recipe_id,
            archived_at: self.archived_at,
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recipe::Ingredient;
    use crate::scaling::Unit;
    use crate::storage::Database;

    async fn create_test_db() -> SqlitePool {
        let db = Database::in_memory()
            .await
            .expect("Failed to create test database");
        db.pool().clone()
    }

    fn draft(title: &str) -> RecipeDraft {
        RecipeDraft::new(title, 4)
            .with_ingredient(Ingredient::new("flour", 2.0, Unit::Cup))
            .with_step("Mix everything")
    }

    async fn seed(repo: &RecipeRepository, title: &str) -> Recipe {
        let recipe = Recipe::new();
        let version = RecipeVersion::from_draft(recipe.id, 1, &draft(title));
        repo.create_with_version(&recipe, &version)
            .await
            .expect("Failed to create recipe");
        recipe
    }

    #[tokio::test]
    async fn test_create_and_get_recipe() {
        let pool = create_test_db().await;
        let repo = RecipeRepository::new(pool);

        let recipe = seed(&repo, "Bread").await;

        let retrieved = repo
            .get_recipe(recipe.id)
            .await
            .expect("Failed to get")
            .expect("Recipe not found");
        assert_eq!(retrieved.id, recipe.id);
        assert_eq!(retrieved.current_version, 1);
        assert!(retrieved.archived_at.is_none());

        let version = repo
            .get_version(recipe.id, 1)
            .await
            .expect("Failed to get version")
            .expect("Version not found");
        assert_eq!(version.title, "Bread");
        assert_eq!(version.ingredients.len(), 1);
    }

    #[tokio::test]
    async fn test_append_version_moves_pointer() {
        let pool = create_test_db().await;
        let repo = RecipeRepository::new(pool);
        let recipe = seed(&repo, "Bread").await;

        let v2 = repo
            .append_version(recipe.id, None, &draft("Sourdough"))
            .await
            .expect("Failed to append");
        assert_eq!(v2.version, 2);

        let retrieved = repo.get_recipe(recipe.id).await.unwrap().unwrap();
        assert_eq!(retrieved.current_version, 2);

        // Version 1 is still there, untouched
        let v1 = repo.get_version(recipe.id, 1).await.unwrap().unwrap();
        assert_eq!(v1.title, "Bread");
    }

    #[tokio::test]
    async fn test_append_version_unknown_recipe() {
        let pool = create_test_db().await;
        let repo = RecipeRepository::new(pool);

        let result = repo.append_version(Uuid::new_v4(), None, &draft("Ghost")).await;
        assert!(matches!(result, Err(Error::RecipeNotFound(_))));
    }

    #[tokio::test]
    async fn test_append_version_conflict() {
        let pool = create_test_db().await;
        let repo = RecipeRepository::new(pool);
        let recipe = seed(&repo, "Bread").await;

        // Another edit lands first
        repo.append_version(recipe.id, None, &draft("Rye"))
            .await
            .expect("Failed to append");

        // An edit expecting version 1 must now fail
        let result = repo.append_version(recipe.id, Some(1), &draft("Stale")).await;
        match result {
            Err(Error::VersionConflict { expected, actual }) => {
                assert_eq!(expected, 1);
                assert_eq!(actual, 2);
            }
            other => panic!("Expected version conflict, got {:?}", other),
        }

        // The conflicting draft left no trace
        let versions = repo.list_versions(recipe.id).await.unwrap();
        assert_eq!(versions.len(), 2);
    }

    #[tokio::test]
    async fn test_get_current_version() {
        let pool = create_test_db().await;
        let repo = RecipeRepository::new(pool);
        let recipe = seed(&repo, "Bread").await;
        repo.append_version(recipe.id, None, &draft("Sourdough"))
            .await
            .expect("Failed to append");

        let current = repo
            .get_current_version(recipe.id)
            .await
            .expect("Failed to get current")
            .expect("No current version");
        assert_eq!(current.version, 2);
        assert_eq!(current.title, "Sourdough");
    }

    #[tokio::test]
    async fn test_list_versions_ascending() {
        let pool = create_test_db().await;
        let repo = RecipeRepository::new(pool);
        let recipe = seed(&repo, "v1").await;
        repo.append_version(recipe.id, None, &draft("v2")).await.unwrap();
        repo.append_version(recipe.id, None, &draft("v3")).await.unwrap();

        let versions = repo.list_versions(recipe.id).await.expect("Failed to list");
        let numbers: Vec<i64> = versions.iter().map(|v| v.version).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_archive_and_listing() {
        let pool = create_test_db().await;
        let repo = RecipeRepository::new(pool);
        let keep = seed(&repo, "Keep").await;
        let gone = seed(&repo, "Gone").await;

        let archived = repo
            .set_archived(gone.id, Utc::now())
            .await
            .expect("Failed to archive");
        assert!(archived);

        let active = repo.list_active_recipes().await.expect("Failed to list");
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, keep.id);

        let all = repo.list_all_recipes().await.expect("Failed to list");
        assert_eq!(all.len(), 2);

        // Archiving an unknown recipe touches nothing
        let missing = repo.set_archived(Uuid::new_v4(), Utc::now()).await.unwrap();
        assert!(!missing);
    }

    #[tokio::test]
    async fn test_list_children() {
        let pool = create_test_db().await;
        let repo = RecipeRepository::new(pool);
        let parent = seed(&repo, "Parent").await;

        let child = Recipe::with_parent(parent.id);
        let version = RecipeVersion::from_draft(child.id, 1, &draft("Child"));
        repo.create_with_version(&child, &version)
            .await
            .expect("Failed to create child");

        let children = repo.list_children(parent.id).await.expect("Failed to list");
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].parent_recipe_id, Some(parent.id));
    }

    #[tokio::test]
    async fn test_list_summaries_uses_current_title() {
        let pool = create_test_db().await;
        let repo = RecipeRepository::new(pool);
        let recipe = seed(&repo, "Old Name").await;
        repo.append_version(recipe.id, None, &draft("New Name"))
            .await
            .expect("Failed to append");

        let summaries = repo.list_summaries(false).await.expect("Failed to list");
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].title, "New Name");
        assert_eq!(summaries[0].current_version, 2);
    }
}
