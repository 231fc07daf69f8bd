//! Heritage graph over recipe duplication links
//!
//! Each recipe carries at most one parent pointer, set when it was
//! duplicated and never changed, so the graph is a forest. Archiving
//! flags a recipe without touching any link on either side.

use std::collections::HashSet;

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::recipe::{Recipe, RecipeRepository, VersionStore};
use crate::error::Result;

/// Ancestor walk cutoff
///
/// Parent pointers cannot form a cycle by construction, but the walk
/// still refuses to follow a chain past this depth.
const MAX_ANCESTOR_DEPTH: usize = 64;

/// A recipe's full lineage view
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Heritage {
    /// The recipe being asked about
    pub recipe: Recipe,

    /// Immediate parent, when the recipe is a duplicate
    pub parent: Option<Recipe>,

    /// All ancestors, nearest first, root last
    pub ancestors: Vec<Recipe>,

    /// Recipes duplicated directly from this one
    pub children: Vec<Recipe>,
}

/// Service owning duplication lineage and archival
#[derive(Debug, Clone)]
pub struct HeritageGraph {
    repository: RecipeRepository,
    versions: VersionStore,
}

impl HeritageGraph {
    /// Create a new heritage graph on the given pool
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            repository: RecipeRepository::new(pool.clone()),
            versions: VersionStore::new(pool),
        }
    }

    /// Duplicate a recipe under a new title
    ///
    /// The duplicate starts a fresh version chain at 1 whose content is
    /// the original's current version, title aside. Only the parent
    /// pointer ties the two together; later edits on either side never
    /// affect the other.
    pub async fn duplicate(&self, original_id: Uuid, new_title: &str) -> Result<Recipe> {
        let current = self.versions.get_current(original_id).await?;

        let mut draft = current.to_draft();
        draft.title = new_title.to_string();

        let duplicate = self.versions.create_with_parent(original_id, &draft).await?;

        info!(
            original_id = %original_id,
            duplicate_id = %duplicate.id,
            title = %new_title,
            "Duplicated recipe"
        );
        Ok(duplicate)
    }

    /// Get a recipe's parent, full ancestor chain and direct children
    ///
    /// Archived recipes appear here like any other; lineage outlives
    /// archival on both sides.
    pub async fn get_heritage(&self, recipe_id: Uuid) -> Result<Heritage> {
        let recipe = self.versions.get(recipe_id).await?;

        let mut ancestors = Vec::new();
        let mut visited: HashSet<Uuid> = HashSet::new();
        visited.insert(recipe.id);

        let mut cursor = recipe.parent_recipe_id;
        while let Some(parent_id) = cursor {
            if !visited.insert(parent_id) {
                warn!(recipe_id = %recipe_id, "Parent chain loops, stopping walk");
                break;
            }
            if ancestors.len() >= MAX_ANCESTOR_DEPTH {
                warn!(recipe_id = %recipe_id, "Parent chain too deep, stopping walk");
                break;
            }
            match self.repository.get_recipe(parent_id).await? {
                Some(parent) => {
                    cursor = parent.parent_recipe_id;
                    ancestors.push(parent);
                }
                None => break,
            }
        }

        let parent = ancestors.first().cloned();
        let children = self.repository.list_children(recipe_id).await?;

        Ok(Heritage {
            recipe,
            parent,
            ancestors,
            children,
        })
    }

    /// Archive a recipe
    ///
    /// Sets the archived timestamp and nothing else: versions,
    /// instances, and heritage links on both sides stay exactly as they
    /// were. Archiving again just refreshes the timestamp.
    pub async fn archive(&self, recipe_id: Uuid) -> Result<Recipe> {
        let mut recipe = self.versions.get(recipe_id).await?;

        if recipe.is_archived() {
            warn!(recipe_id = %recipe_id, "Recipe already archived, refreshing timestamp");
        }

        let archived_at = Utc::now();
        self.repository.set_archived(recipe_id, archived_at).await?;
        recipe.archived_at = Some(archived_at);

        info!(recipe_id = %recipe_id, "Archived recipe");
        Ok(recipe)
    }

    /// List recipes that have not been archived
    pub async fn list_active(&self) -> Result<Vec<Recipe>> {
        self.repository.list_active_recipes().await
    }

    /// List every recipe, archived included
    pub async fn list_all(&self) -> Result<Vec<Recipe>> {
        self.repository.list_all_recipes().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recipe::{Ingredient, RecipeDraft};
    use crate::error::Error;
    use crate::scaling::Unit;
    use crate::storage::Database;

    async fn create_test_graph() -> (HeritageGraph, VersionStore) {
        let db = Database::in_memory()
            .await
            .expect("Failed to create test database");
        let pool = db.pool().clone();
        (HeritageGraph::new(pool.clone()), VersionStore::new(pool))
    }

    fn draft(title: &str) -> RecipeDraft {
        RecipeDraft::new(title, 4)
            .with_ingredient(Ingredient::new("flour", 2.0, Unit::Cup))
            .with_step("Mix and bake")
    }

    #[tokio::test]
    async fn test_duplicate_copies_current_content() {
        let (graph, store) = create_test_graph().await;

        let original = store.create(&draft("Grandma's Rolls")).await.expect("Failed to create");
        let mut edited = draft("Grandma's Rolls");
        edited.ingredients[0].quantity = 3.0;
        store.update(original.id, &edited).await.expect("Failed to update");

        let copy = graph
            .duplicate(original.id, "My Rolls")
            .await
            .expect("Failed to duplicate");

        assert_eq!(copy.parent_recipe_id, Some(original.id));
        assert_eq!(copy.current_version, 1);

        // Content came from the original's current version
        let v1 = store.get_version(copy.id, 1).await.expect("Failed to get");
        assert_eq!(v1.title, "My Rolls");
        assert_eq!(v1.ingredients[0].quantity, 3.0);
    }

    #[tokio::test]
    async fn test_duplicate_histories_are_independent() {
        let (graph, store) = create_test_graph().await;
        let original = store.create(&draft("Original")).await.expect("Failed to create");
        let copy = graph.duplicate(original.id, "Copy").await.expect("Failed to duplicate");

        store.update(original.id, &draft("Original edited")).await.expect("Failed to update");

        let copy_current = store.get_current(copy.id).await.expect("Failed to get");
        assert_eq!(copy_current.title, "Copy");
        assert_eq!(store.get_history(copy.id).await.unwrap().len(), 1);
        assert_eq!(store.get_history(original.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_missing_recipe() {
        let (graph, _) = create_test_graph().await;
        let result = graph.duplicate(Uuid::new_v4(), "Ghost").await;
        assert!(matches!(result, Err(Error::RecipeNotFound(_))));
    }

    #[tokio::test]
    async fn test_heritage_chain_nearest_first() {
        let (graph, store) = create_test_graph().await;

        let a = store.create(&draft("A")).await.expect("Failed to create");
        let b = graph.duplicate(a.id, "B").await.expect("Failed to duplicate");
        let c = graph.duplicate(b.id, "C").await.expect("Failed to duplicate");
        let d = graph.duplicate(c.id, "D").await.expect("Failed to duplicate");

        let heritage = graph.get_heritage(d.id).await.expect("Failed to get heritage");
        let ancestor_ids: Vec<Uuid> = heritage.ancestors.iter().map(|r| r.id).collect();
        assert_eq!(ancestor_ids, vec![c.id, b.id, a.id]);
        assert_eq!(heritage.parent.as_ref().map(|p| p.id), Some(c.id));
        assert!(heritage.children.is_empty());

        let heritage_a = graph.get_heritage(a.id).await.expect("Failed to get heritage");
        assert!(heritage_a.parent.is_none());
        assert!(heritage_a.ancestors.is_empty());
        assert_eq!(heritage_a.children.len(), 1);
        assert_eq!(heritage_a.children[0].id, b.id);
    }

    #[tokio::test]
    async fn test_heritage_survives_archiving() {
        let (graph, store) = create_test_graph().await;

        let a = store.create(&draft("A")).await.expect("Failed to create");
        let b = graph.duplicate(a.id, "B").await.expect("Failed to duplicate");
        let c = graph.duplicate(b.id, "C").await.expect("Failed to duplicate");

        // Archive the middle of the chain
        graph.archive(b.id).await.expect("Failed to archive");

        let heritage = graph.get_heritage(c.id).await.expect("Failed to get heritage");
        assert_eq!(heritage.ancestors.len(), 2);
        assert_eq!(heritage.ancestors[0].id, b.id);
        assert!(heritage.ancestors[0].is_archived());

        let heritage_a = graph.get_heritage(a.id).await.expect("Failed to get heritage");
        assert_eq!(heritage_a.children.len(), 1);
    }

    #[tokio::test]
    async fn test_archive_only_hides_from_active_listing() {
        let (graph, store) = create_test_graph().await;

        let keep = store.create(&draft("Keep")).await.expect("Failed to create");
        let gone = store.create(&draft("Gone")).await.expect("Failed to create");

        let archived = graph.archive(gone.id).await.expect("Failed to archive");
        assert!(archived.is_archived());

        let active = graph.list_active().await.expect("Failed to list");
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, keep.id);

        let all = graph.list_all().await.expect("Failed to list");
        assert_eq!(all.len(), 2);

        // History still fully readable
        assert_eq!(store.get_history(gone.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_archive_is_idempotent() {
        let (graph, store) = create_test_graph().await;
        let recipe = store.create(&draft("Twice")).await.expect("Failed to create");

        let first = graph.archive(recipe.id).await.expect("Failed to archive");
        let second = graph.archive(recipe.id).await.expect("Failed to archive again");

        assert!(first.is_archived());
        assert!(second.is_archived());
        assert!(second.archived_at >= first.archived_at);
    }
}
