//! Instance manager coordinating capture and reconstruction
//!
//! Capture freezes the recipe's current version into the instance;
//! reconstruction replays scale, overrides and unit conversion against
//! that frozen version, so the answer never drifts as the live recipe
//! keeps changing.

use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::instance::{InstanceDraft, RecipeInstance, ReconstructedRecipe};
use super::repository::InstanceRepository;
use crate::domain::recipe::{RecipeVersion, VersionStore};
use crate::error::{Error, Result};
use crate::scaling::{convert_to_system, scale, UnitSystem};

/// Service owning cooking instance snapshots
#[derive(Debug, Clone)]
pub struct InstanceManager {
    repository: InstanceRepository,
    versions: VersionStore,
}

impl InstanceManager {
    /// Create a new instance manager on the given pool
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            repository: InstanceRepository::new(pool.clone()),
            versions: VersionStore::new(pool),
        }
    }

    /// Capture an instance of a recipe as it stands right now
    ///
    /// The recipe's current version is read once and frozen into the
    /// instance. Unset draft fields fall back to scale 1.0, US units,
    /// and the frozen version's serving count.
    pub async fn create(&self, recipe_id: Uuid, draft: &InstanceDraft) -> Result<RecipeInstance> {
        let frozen = self.versions.get_current(recipe_id).await?;

        let scale_factor = draft.scale_factor.unwrap_or(1.0);
        let unit_system = draft.unit_system.unwrap_or(UnitSystem::Us);
        let servings = draft.servings.unwrap_or(frozen.servings);

        validate_draft(draft, scale_factor, servings, &frozen)?;

        let mut instance = RecipeInstance::new(
            recipe_id,
            frozen.version,
            scale_factor,
            unit_system,
            servings,
        );
        instance.notes = draft.notes.clone();
        instance.modifications = draft.modifications.clone();

        self.repository.save(&instance).await?;

        info!(
            instance_id = %instance.id,
            recipe_id = %recipe_id,
            recipe_version = frozen.version,
            scale_factor = scale_factor,
            "Captured cooking instance"
        );
        Ok(instance)
    }

    /// Get an instance by ID
    pub async fn get(&self, instance_id: Uuid) -> Result<RecipeInstance> {
        self.repository
            .get(instance_id)
            .await?
            .ok_or_else(|| Error::InstanceNotFound(instance_id.to_string()))
    }

    /// List a recipe's instances, newest first
    pub async fn list_for_recipe(&self, recipe_id: Uuid) -> Result<Vec<RecipeInstance>> {
        // Missing recipe and no recorded cooks are different answers
        self.versions.get(recipe_id).await?;
        self.repository.list_for_recipe(recipe_id).await
    }

    /// Rebuild the exact quantities of a past cook
    ///
    /// Works from the frozen version only. Per ingredient: an override
    /// supplies its quantity verbatim with scaling skipped, anything
    /// else is scaled by the instance's factor. Every result is then
    /// converted into the instance's unit system, always from that
    /// single computed value, never from a previous conversion.
    pub async fn reconstruct(&self, instance_id: Uuid) -> Result<ReconstructedRecipe> {
        let instance = self.get(instance_id).await?;
        let frozen = self
            .versions
            .get_version(instance.recipe_id, instance.recipe_version)
            .await?;

        let mut ingredients = Vec::with_capacity(frozen.ingredients.len());
        for (index, ingredient) in frozen.ingredients.iter().enumerate() {
            let resolved = match instance.modification_for(index) {
                Some(modification) => {
                    let mut modified = ingredient.clone();
                    modified.quantity = modification.modified_quantity;
                    modified
                }
                None => scale(ingredient, instance.scale_factor)?,
            };
            ingredients.push(convert_to_system(&resolved, instance.unit_system));
        }

        debug!(
            instance_id = %instance_id,
            recipe_id = %instance.recipe_id,
            recipe_version = instance.recipe_version,
            "Reconstructed instance"
        );

        Ok(ReconstructedRecipe {
            instance_id: instance.id,
            recipe_id: instance.recipe_id,
            recipe_version: instance.recipe_version,
            title: frozen.title,
            ingredients,
            instructions: frozen.instructions,
            servings: instance.servings,
            scale_factor: instance.scale_factor,
            unit_system: instance.unit_system,
        })
    }

    /// Link an instance to a cook session
    ///
    /// A one-directional reference with no effect on reconstruction.
    /// Linking again replaces the previous reference.
    pub async fn link(&self, instance_id: Uuid, cook_session_id: &str) -> Result<()> {
        let instance = self.get(instance_id).await?;

        if let Some(existing) = &instance.cook_session_id {
            warn!(
                instance_id = %instance_id,
                previous = %existing,
                "Replacing existing cook session link"
            );
        }

        self.repository.set_cook_session(instance_id, cook_session_id).await?;

        info!(
            instance_id = %instance_id,
            cook_session_id = %cook_session_id,
            "Linked instance to cook session"
        );
        Ok(())
    }

    /// Append a photo reference to an instance
    pub async fn add_photo(&self, instance_id: Uuid, photo_id: &str) -> Result<()> {
        self.get(instance_id).await?;
        self.repository.add_photo(instance_id, photo_id).await?;

        info!(instance_id = %instance_id, photo_id = %photo_id, "Added instance photo");
        Ok(())
    }
}

fn validate_draft(
    draft: &InstanceDraft,
    scale_factor: f64,
    servings: i64,
    frozen: &RecipeVersion,
) -> Result<()> {
    if !scale_factor.is_finite() || scale_factor <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "Scale factor must be a positive number, got {}",
            scale_factor
        )));
    }
    if servings <= 0 {
        return Err(Error::InvalidInput(format!(
            "Servings must be positive, got {}",
            servings
        )));
    }

    let mut seen = std::collections::HashSet::new();
    for modification in &draft.modifications {
        if modification.ingredient_index >= frozen.ingredients.len() {
            return Err(Error::InvalidInput(format!(
                "Modification points at ingredient {} but the version has only {}",
                modification.ingredient_index,
                frozen.ingredients.len()
            )));
        }
        if !seen.insert(modification.ingredient_index) {
            return Err(Error::InvalidInput(format!(
                "Ingredient {} has more than one modification",
                modification.ingredient_index
            )));
        }
        if !modification.modified_quantity.is_finite() || modification.modified_quantity <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "Modified quantity for ingredient {} must be positive, got {}",
                modification.ingredient_index, modification.modified_quantity
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::instance::IngredientModification;
    use crate::domain::recipe::{Ingredient, RecipeDraft};
    use crate::scaling::Unit;
    use crate::storage::Database;

    async fn create_test_manager() -> (InstanceManager, VersionStore) {
        let db = Database::in_memory()
            .await
            .expect("Failed to create test database");
        let pool = db.pool().clone();
        (InstanceManager::new(pool.clone()), VersionStore::new(pool))
    }

    fn pancake_draft() -> RecipeDraft {
        RecipeDraft::new("Pancakes", 4)
            .with_ingredient(Ingredient::new("flour", 2.0, Unit::Cup))
            .with_ingredient(Ingredient::new("milk", 2.0, Unit::Cup))
            .with_ingredient(Ingredient::new("eggs", 2.0, Unit::Piece))
            .with_step("Whisk")
            .with_step("Fry")
    }

    #[tokio::test]
    async fn test_create_freezes_current_version() {
        let (manager, store) = create_test_manager().await;
        let recipe = store.create(&pancake_draft()).await.expect("Failed to create");
        store.update(recipe.id, &pancake_draft()).await.expect("Failed to update");

        let instance = manager
            .create(recipe.id, &InstanceDraft::new())
            .await
            .expect("Failed to capture");
        assert_eq!(instance.recipe_version, 2);

        // Edits after capture leave the instance untouched
        store.update(recipe.id, &pancake_draft()).await.expect("Failed to update");
        let retrieved = manager.get(instance.id).await.expect("Failed to get");
        assert_eq!(retrieved.recipe_version, 2);
    }

    #[tokio::test]
    async fn test_create_applies_defaults() {
        let (manager, store) = create_test_manager().await;
        let recipe = store.create(&pancake_draft()).await.expect("Failed to create");

        let instance = manager
            .create(recipe.id, &InstanceDraft::new())
            .await
            .expect("Failed to capture");
        assert_eq!(instance.scale_factor, 1.0);
        assert_eq!(instance.unit_system, UnitSystem::Us);
        assert_eq!(instance.servings, 4);
    }

    #[tokio::test]
    async fn test_create_validates() {
        let (manager, store) = create_test_manager().await;
        let recipe = store.create(&pancake_draft()).await.expect("Failed to create");

        let bad_scale = InstanceDraft::new().with_scale(0.0);
        assert!(manager.create(recipe.id, &bad_scale).await.is_err());

        let bad_index = InstanceDraft::new()
            .with_modification(IngredientModification::new(9, 1.0, 1.0));
        assert!(manager.create(recipe.id, &bad_index).await.is_err());

        let bad_quantity = InstanceDraft::new()
            .with_modification(IngredientModification::new(0, 2.0, -1.0));
        assert!(manager.create(recipe.id, &bad_quantity).await.is_err());

        let duplicate = InstanceDraft::new()
            .with_modification(IngredientModification::new(0, 2.0, 1.5))
            .with_modification(IngredientModification::new(0, 2.0, 1.75));
        assert!(manager.create(recipe.id, &duplicate).await.is_err());

        let missing = manager.create(Uuid::new_v4(), &InstanceDraft::new()).await;
        assert!(matches!(missing, Err(Error::RecipeNotFound(_))));
    }

    #[tokio::test]
    async fn test_reconstruct_identity() {
        let (manager, store) = create_test_manager().await;
        let recipe = store.create(&pancake_draft()).await.expect("Failed to create");

        let instance = manager
            .create(recipe.id, &InstanceDraft::new())
            .await
            .expect("Failed to capture");
        let rebuilt = manager.reconstruct(instance.id).await.expect("Failed to reconstruct");

        // Scale 1.0, US units, no overrides: quantities come back as entered
        assert_eq!(rebuilt.title, "Pancakes");
        assert_eq!(rebuilt.servings, 4);
        let quantities: Vec<f64> = rebuilt.ingredients.iter().map(|i| i.quantity).collect();
        assert_eq!(quantities, vec![2.0, 2.0, 2.0]);
        assert_eq!(rebuilt.ingredients[0].unit, Unit::Cup);
        assert_eq!(rebuilt.instructions.len(), 2);
    }

    #[tokio::test]
    async fn test_reconstruct_scales_unmodified_ingredients() {
        let (manager, store) = create_test_manager().await;
        let recipe = store.create(&pancake_draft()).await.expect("Failed to create");

        let draft = InstanceDraft::new().with_scale(2.0).with_servings(8);
        let instance = manager.create(recipe.id, &draft).await.expect("Failed to capture");
        let rebuilt = manager.reconstruct(instance.id).await.expect("Failed to reconstruct");

        assert_eq!(rebuilt.ingredients[0].quantity, 4.0);
        assert_eq!(rebuilt.ingredients[1].quantity, 4.0);
        assert_eq!(rebuilt.ingredients[2].quantity, 4.0);
        assert_eq!(rebuilt.servings, 8);
    }

    #[tokio::test]
    async fn test_reconstruct_uses_modification_verbatim() {
        let (manager, store) = create_test_manager().await;
        let recipe = store.create(&pancake_draft()).await.expect("Failed to create");

        // Tripled the batch but ran short of flour
        let draft = InstanceDraft::new()
            .with_scale(3.0)
            .with_modification(IngredientModification::new(0, 2.0, 2.75).with_note("ran short"));
        let instance = manager.create(recipe.id, &draft).await.expect("Failed to capture");
        let rebuilt = manager.reconstruct(instance.id).await.expect("Failed to reconstruct");

        // The override is used as-is, never multiplied by the scale
        assert_eq!(rebuilt.ingredients[0].quantity, 2.75);
        assert_eq!(rebuilt.ingredients[1].quantity, 6.0);
    }

    #[tokio::test]
    async fn test_reconstruct_converts_to_instance_system() {
        let (manager, store) = create_test_manager().await;
        let recipe = store.create(&pancake_draft()).await.expect("Failed to create");

        let draft = InstanceDraft::new().with_unit_system(UnitSystem::Metric);
        let instance = manager.create(recipe.id, &draft).await.expect("Failed to capture");
        let rebuilt = manager.reconstruct(instance.id).await.expect("Failed to reconstruct");

        // 2 cups of milk is 473.176 ml; the ladder keeps it in ml
        assert_eq!(rebuilt.ingredients[1].unit, Unit::Ml);
        assert!((rebuilt.ingredients[1].quantity - 473.18).abs() < 1e-9);

        // Count units have no metric rendering
        assert_eq!(rebuilt.ingredients[2].unit, Unit::Piece);
        assert_eq!(rebuilt.ingredients[2].quantity, 2.0);
    }

    #[tokio::test]
    async fn test_reconstruct_is_stable_across_recipe_edits() {
        let (manager, store) = create_test_manager().await;
        let recipe = store.create(&pancake_draft()).await.expect("Failed to create");

        let instance = manager
            .create(recipe.id, &InstanceDraft::new().with_scale(2.0))
            .await
            .expect("Failed to capture");
        let before = manager.reconstruct(instance.id).await.expect("Failed to reconstruct");

        // Heavy editing after the cook
        let mut edited = pancake_draft();
        edited.ingredients[0].quantity = 5.0;
        edited.title = "Crepes".to_string();
        store.update(recipe.id, &edited).await.expect("Failed to update");
        store.restore(recipe.id, 1).await.expect("Failed to restore");

        let after = manager.reconstruct(instance.id).await.expect("Failed to reconstruct");
        assert_eq!(after.title, before.title);
        let before_q: Vec<f64> = before.ingredients.iter().map(|i| i.quantity).collect();
        let after_q: Vec<f64> = after.ingredients.iter().map(|i| i.quantity).collect();
        assert_eq!(before_q, after_q);
    }

    #[tokio::test]
    async fn test_list_for_recipe() {
        let (manager, store) = create_test_manager().await;
        let recipe = store.create(&pancake_draft()).await.expect("Failed to create");

        manager.create(recipe.id, &InstanceDraft::new()).await.expect("Failed to capture");
        let second = manager
            .create(recipe.id, &InstanceDraft::new().with_scale(2.0))
            .await
            .expect("Failed to capture");

        let instances = manager.list_for_recipe(recipe.id).await.expect("Failed to list");
        assert_eq!(instances.len(), 2);
        assert_eq!(instances[0].id, second.id);

        let missing = manager.list_for_recipe(Uuid::new_v4()).await;
        assert!(matches!(missing, Err(Error::RecipeNotFound(_))));
    }

    #[tokio::test]
    async fn test_link_and_photos() {
        let (manager, store) = create_test_manager().await;
        let recipe = store.create(&pancake_draft()).await.expect("Failed to create");
        let instance = manager
            .create(recipe.id, &InstanceDraft::new())
            .await
            .expect("Failed to capture");

        manager.link(instance.id, "session-1").await.expect("Failed to link");
        manager.add_photo(instance.id, "photo-1").await.expect("Failed to add photo");
        manager.add_photo(instance.id, "photo-2").await.expect("Failed to add photo");

        let retrieved = manager.get(instance.id).await.expect("Failed to get");
        assert_eq!(retrieved.cook_session_id.as_deref(), Some("session-1"));
        assert_eq!(retrieved.photo_ids, vec!["photo-1", "photo-2"]);

        // Re-linking replaces the reference
        manager.link(instance.id, "session-2").await.expect("Failed to relink");
        let retrieved = manager.get(instance.id).await.expect("Failed to get");
        assert_eq!(retrieved.cook_session_id.as_deref(), Some("session-2"));

        // Reconstruction is unaffected by link or photos
        let rebuilt = manager.reconstruct(instance.id).await.expect("Failed to reconstruct");
        assert_eq!(rebuilt.ingredients[0].quantity, 2.0);
    }
}
