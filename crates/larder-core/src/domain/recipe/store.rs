//! Version store coordinating the append-only edit history
//!
//! Every edit path funnels through here: create writes identity plus
//! version 1 atomically, update appends the next snapshot, restore
//! replays an old snapshot through the same append path. No operation
//! ever rewrites or deletes an existing version.

use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use super::recipe::{Recipe, RecipeDraft, RecipeSummary, RecipeVersion};
use super::repository::RecipeRepository;
use crate::error::{Error, Result};

/// Service owning the immutable version chain of every recipe
#[derive(Debug, Clone)]
pub struct VersionStore {
    repository: RecipeRepository,
}

impl VersionStore {
    /// Create a new version store on the given pool
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            repository: RecipeRepository::new(pool),
        }
    }

    /// Create a recipe from a draft
    ///
    /// The identity row and version 1 are written in one transaction.
    pub async fn create(&self, draft: &RecipeDraft) -> Result<Recipe> {
        draft.validate()?;

        let recipe = Recipe::new();
        let version = RecipeVersion::from_draft(recipe.id, 1, draft);
        self.repository.create_with_version(&recipe, &version).await?;

        info!(recipe_id = %recipe.id, title = %draft.title, "Created recipe");
        Ok(recipe)
    }

    /// Create a recipe whose lineage points at an existing one
    ///
    /// Used by duplication; the parent link is set here at creation and
    /// never changes afterwards.
    pub async fn create_with_parent(
        &self,
        parent_recipe_id: Uuid,
        draft: &RecipeDraft,
    ) -> Result<Recipe> {
        draft.validate()?;

        let recipe = Recipe::with_parent(parent_recipe_id);
        let version = RecipeVersion::from_draft(recipe.id, 1, draft);
        self.repository.create_with_version(&recipe, &version).await?;

        info!(
            recipe_id = %recipe.id,
            parent_recipe_id = %parent_recipe_id,
            "Created recipe from parent"
        );
        Ok(recipe)
    }

    /// Append a new version with the draft's content
    ///
    /// The previous current version stays readable forever; only the
    /// recipe's pointer moves.
    pub async fn update(&self, recipe_id: Uuid, draft: &RecipeDraft) -> Result<RecipeVersion> {
        draft.validate()?;

        let version = self.repository.append_version(recipe_id, None, draft).await?;

        info!(recipe_id = %recipe_id, version = version.version, "Appended recipe version");
        Ok(version)
    }

    /// Append a new version, but only if the chain is where the caller
    /// last saw it
    ///
    /// Fails with a version conflict when someone else edited in
    /// between, instead of silently building on content the caller
    /// never reviewed.
    pub async fn update_expecting(
        &self,
        recipe_id: Uuid,
        expected_version: i64,
        draft: &RecipeDraft,
    ) -> Result<RecipeVersion> {
        draft.validate()?;

        let version = self
            .repository
            .append_version(recipe_id, Some(expected_version), draft)
            .await?;

        info!(recipe_id = %recipe_id, version = version.version, "Appended recipe version");
        Ok(version)
    }

    /// Bring an old version's content back as the newest version
    ///
    /// Restore is an append like any other edit. Nothing rewinds: the
    /// versions between then and now remain exactly as they were.
    pub async fn restore(&self, recipe_id: Uuid, version: i64) -> Result<RecipeVersion> {
        let snapshot = self.get_version(recipe_id, version).await?;
        debug!(recipe_id = %recipe_id, version = version, "Restoring snapshot");

        let restored = self.update(recipe_id, &snapshot.to_draft()).await?;

        info!(
            recipe_id = %recipe_id,
            from_version = version,
            new_version = restored.version,
            "Restored recipe version"
        );
        Ok(restored)
    }

    /// Get a recipe identity by ID
    pub async fn get(&self, recipe_id: Uuid) -> Result<Recipe> {
        self.repository
            .get_recipe(recipe_id)
            .await?
            .ok_or_else(|| Error::RecipeNotFound(recipe_id.to_string()))
    }

    /// Get a specific version of a recipe
    pub async fn get_version(&self, recipe_id: Uuid, version: i64) -> Result<RecipeVersion> {
        match self.repository.get_version(recipe_id, version).await? {
            Some(snapshot) => Ok(snapshot),
            None => {
                // Distinguish a missing recipe from a missing version
                if self.repository.get_recipe(recipe_id).await?.is_some() {
                    Err(Error::VersionNotFound(recipe_id.to_string(), version))
                } else {
                    Err(Error::RecipeNotFound(recipe_id.to_string()))
                }
            }
        }
    }

    /// Get the version the recipe currently points at
    pub async fn get_current(&self, recipe_id: Uuid) -> Result<RecipeVersion> {
        self.repository
            .get_current_version(recipe_id)
            .await?
            .ok_or_else(|| Error::RecipeNotFound(recipe_id.to_string()))
    }

    /// Get the full edit history, earliest version first
    pub async fn get_history(&self, recipe_id: Uuid) -> Result<Vec<RecipeVersion>> {
        // Missing recipe and empty history are different answers
        self.get(recipe_id).await?;
        self.repository.list_versions(recipe_id).await
    }

    /// List recipes with their current titles
    pub async fn list_summaries(&self, include_archived: bool) -> Result<Vec<RecipeSummary>> {
        self.repository.list_summaries(include_archived).await
    }
}
