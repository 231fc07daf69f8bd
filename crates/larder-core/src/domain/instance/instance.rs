//! Cooking instance snapshot types
//!
//! An instance freezes how a recipe was actually cooked on one
//! occasion: which version, at what scale, in which unit system, with
//! which ad-hoc quantity overrides.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::recipe::{Ingredient, Instruction};
use crate::scaling::UnitSystem;

/// A per-ingredient quantity override recorded while cooking
///
/// Indexes into the frozen version's ingredient list. The modified
/// quantity is what actually went into the pot; reconstruction uses it
/// verbatim and skips scaling for that ingredient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientModification {
    /// Position in the frozen version's ingredient list
    pub ingredient_index: usize,

    /// Quantity the version called for
    pub original_quantity: f64,

    /// Quantity actually used
    pub modified_quantity: f64,

    /// Why it changed ("ran short", "doubled the garlic anyway")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl IngredientModification {
    /// Record an override for one ingredient
    pub fn new(ingredient_index: usize, original_quantity: f64, modified_quantity: f64) -> Self {
        Self {
            ingredient_index,
            original_quantity,
            modified_quantity,
            note: None,
        }
    }

    /// Attach a note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// A frozen record of one cooking session's setup
///
/// `recipe_version` is fixed at creation and never re-pointed; the
/// referenced version row is never deleted, so an instance can always
/// be reconstructed exactly. After creation only the cook-session link
/// and the photo list may change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeInstance {
    /// Unique instance identifier
    pub id: Uuid,

    /// Recipe that was cooked
    pub recipe_id: Uuid,

    /// Version that was current when cooking started
    pub recipe_version: i64,

    /// Multiplier applied to every unmodified quantity
    pub scale_factor: f64,

    /// Unit system the cook viewed quantities in
    pub unit_system: UnitSystem,

    /// Servings this cook aimed for
    pub servings: i64,

    /// Free-form note about the session
    pub notes: Option<String>,

    /// Quantity overrides, at most one per ingredient
    pub modifications: Vec<IngredientModification>,

    /// Opaque photo references, append-only
    pub photo_ids: Vec<String>,

    /// Cook session this instance was linked to, if any
    pub cook_session_id: Option<String>,

    /// When the instance was captured
    pub created_at: DateTime<Utc>,
}

impl RecipeInstance {
    /// Create an instance frozen at the given version
    pub fn new(
        recipe_id: Uuid,
        recipe_version: i64,
        scale_factor: f64,
        unit_system: UnitSystem,
        servings: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipe_id,
            recipe_version,
            scale_factor,
            unit_system,
            servings,
            notes: None,
            modifications: Vec::new(),
            photo_ids: Vec::new(),
            cook_session_id: None,
            created_at: Utc::now(),
        }
    }

    /// Find the override for an ingredient position, if one was recorded
    pub fn modification_for(&self, ingredient_index: usize) -> Option<&IngredientModification> {
        self.modifications
            .iter()
            .find(|m| m.ingredient_index == ingredient_index)
    }
}

/// What a cook chooses when capturing an instance
///
/// Everything is optional; unset fields fall back to scale 1.0, the US
/// system, and the frozen version's serving count.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstanceDraft {
    /// Multiplier to cook at
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_factor: Option<f64>,

    /// Unit system to view quantities in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_system: Option<UnitSystem>,

    /// Servings aimed for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings: Option<i64>,

    /// Free-form note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Quantity overrides
    #[serde(default)]
    pub modifications: Vec<IngredientModification>,
}

impl InstanceDraft {
    /// Create an empty draft taking every default
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the scale factor
    pub fn with_scale(mut self, scale_factor: f64) -> Self {
        self.scale_factor = Some(scale_factor);
        self
    }

    /// Set the unit system
    pub fn with_unit_system(mut self, unit_system: UnitSystem) -> Self {
        self.unit_system = Some(unit_system);
        self
    }

    /// Set the serving count
    pub fn with_servings(mut self, servings: i64) -> Self {
        self.servings = Some(servings);
        self
    }

    /// Attach a note
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Record a quantity override
    pub fn with_modification(mut self, modification: IngredientModification) -> Self {
        self.modifications.push(modification);
        self
    }
}

/// The exact quantities of a past cook, rebuilt on demand
///
/// Derived fresh from the frozen version every time, so it reflects the
/// instance's scale, overrides and unit system but never any edit made
/// to the recipe since.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconstructedRecipe {
    /// Instance this was rebuilt from
    pub instance_id: Uuid,

    /// Recipe that was cooked
    pub recipe_id: Uuid,

    /// Version the quantities come from
    pub recipe_version: i64,

    /// Title of the frozen version
    pub title: String,

    /// Final ingredient quantities, scaled, overridden and converted
    pub ingredients: Vec<Ingredient>,

    /// Instruction steps of the frozen version
    pub instructions: Vec<Instruction>,

    /// Servings the cook aimed for
    pub servings: i64,

    /// Scale the instance was cooked at
    pub scale_factor: f64,

    /// Unit system the quantities are presented in
    pub unit_system: UnitSystem,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_new_starts_clean() {
        let recipe_id = Uuid::new_v4();
        let instance = RecipeInstance::new(recipe_id, 3, 2.0, UnitSystem::Metric, 8);

        assert_eq!(instance.recipe_id, recipe_id);
        assert_eq!(instance.recipe_version, 3);
        assert!(instance.modifications.is_empty());
        assert!(instance.photo_ids.is_empty());
        assert!(instance.cook_session_id.is_none());
    }

    #[test]
    fn test_modification_lookup_by_index() {
        let mut instance = RecipeInstance::new(Uuid::new_v4(), 1, 1.0, UnitSystem::Us, 4);
        instance
            .modifications
            .push(IngredientModification::new(2, 1.0, 1.5).with_note("extra"));

        assert!(instance.modification_for(0).is_none());
        let m = instance.modification_for(2).expect("Missing modification");
        assert_eq!(m.modified_quantity, 1.5);
        assert_eq!(m.note.as_deref(), Some("extra"));
    }

    #[test]
    fn test_draft_builders() {
        let draft = InstanceDraft::new()
            .with_scale(0.5)
            .with_unit_system(UnitSystem::Metric)
            .with_servings(2)
            .with_modification(IngredientModification::new(0, 2.0, 1.75));

        assert_eq!(draft.scale_factor, Some(0.5));
        assert_eq!(draft.unit_system, Some(UnitSystem::Metric));
        assert_eq!(draft.servings, Some(2));
        assert_eq!(draft.modifications.len(), 1);
    }
}
