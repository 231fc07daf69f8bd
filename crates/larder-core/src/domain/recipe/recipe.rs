//! Recipe entity and version snapshot types
//!
//! A `Recipe` is a thin identity row; everything a cook actually reads
//! lives in immutable `RecipeVersion` snapshots appended one per edit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::scaling::Unit;

/// A single ingredient line within a recipe version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Ingredient name as entered ("all-purpose flour")
    pub name: String,

    /// Amount in `unit`, always positive
    pub quantity: f64,

    /// Measurement unit
    pub unit: Unit,

    /// Free-form note ("sifted", "room temperature")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Grouping label for display ("dairy", "dry goods")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Ingredient {
    /// Create an ingredient with no notes or category
    pub fn new(name: impl Into<String>, quantity: f64, unit: Unit) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit,
            notes: None,
            category: None,
        }
    }

    /// Attach a note
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Attach a category label
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// A single numbered instruction step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// 1-based step number, contiguous within a version
    pub step: i64,

    /// What to do
    pub text: String,

    /// How long the step takes, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_mins: Option<i64>,

    /// Free-form note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Instruction {
    /// Create an instruction step
    pub fn new(step: i64, text: impl Into<String>) -> Self {
        Self {
            step,
            text: text.into(),
            duration_mins: None,
            notes: None,
        }
    }

    /// Attach a duration in minutes
    pub fn with_duration(mut self, mins: i64) -> Self {
        self.duration_mins = Some(mins);
        self
    }
}

/// Recipe identity row
///
/// Carries only what never belongs to a version: the id, the pointer to
/// the current version, the duplication parent, and archival state. All
/// content lives in `RecipeVersion` rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Unique recipe identifier
    pub id: Uuid,

    /// Highest version number, which is also the version count
    pub current_version: i64,

    /// Recipe this one was duplicated from, set once at creation
    pub parent_recipe_id: Option<Uuid>,

    /// When the recipe was archived, if it has been
    pub archived_at: Option<DateTime<Utc>>,

    /// When the recipe was created
    pub created_at: DateTime<Utc>,
}

impl Recipe {
    /// Create a new recipe identity pointing at version 1
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            current_version: 1,
            parent_recipe_id: None,
            archived_at: None,
            created_at: Utc::now(),
        }
    }

    /// Create a duplicate identity linked to its original
    pub fn with_parent(parent_recipe_id: Uuid) -> Self {
        Self {
            parent_recipe_id: Some(parent_recipe_id),
            ..Self::new()
        }
    }

    /// Check whether the recipe has been archived
    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }
}

impl Default for Recipe {
    fn default() -> Self {
        Self::new()
    }
}

/// One immutable snapshot of a recipe's content
///
/// Never updated after insertion; edits append the next version number
/// instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeVersion {
    /// Unique version row identifier
    pub id: Uuid,

    /// Recipe this version belongs to
    pub recipe_id: Uuid,

    /// Position in the chain, starting at 1
    pub version: i64,

    /// Recipe title
    pub title: String,

    /// Longer description
    pub description: Option<String>,

    /// Ingredient list in display order
    pub ingredients: Vec<Ingredient>,

    /// Numbered instruction steps
    pub instructions: Vec<Instruction>,

    /// Preparation time in minutes
    pub prep_time_mins: i64,

    /// Cooking time in minutes
    pub cook_time_mins: i64,

    /// How many servings the quantities yield
    pub servings: i64,

    /// Where the recipe came from
    pub source_url: Option<String>,

    /// When this version was created
    pub created_at: DateTime<Utc>,
}

impl RecipeVersion {
    /// Materialize a draft as the given version of a recipe
    pub fn from_draft(recipe_id: Uuid, version: i64, draft: &RecipeDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipe_id,
            version,
            title: draft.title.clone(),
            description: draft.description.clone(),
            ingredients: draft.ingredients.clone(),
            instructions: draft.instructions.clone(),
            prep_time_mins: draft.prep_time_mins,
            cook_time_mins: draft.cook_time_mins,
            servings: draft.servings,
            source_url: draft.source_url.clone(),
            created_at: Utc::now(),
        }
    }

    /// Turn this version's content back into a draft
    ///
    /// Restoring an old version routes through the normal edit path, so
    /// the snapshot has to become an editable draft again.
    pub fn to_draft(&self) -> RecipeDraft {
        RecipeDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            ingredients: self.ingredients.clone(),
            instructions: self.instructions.clone(),
            prep_time_mins: self.prep_time_mins,
            cook_time_mins: self.cook_time_mins,
            servings: self.servings,
            source_url: self.source_url.clone(),
        }
    }

    /// Total time in minutes
    pub fn total_time_mins(&self) -> i64 {
        self.prep_time_mins + self.cook_time_mins
    }
}

/// Editable recipe content, not yet tied to a version number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDraft {
    /// Recipe title
    pub title: String,

    /// Longer description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Ingredient list in display order
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,

    /// Numbered instruction steps
    #[serde(default)]
    pub instructions: Vec<Instruction>,

    /// Preparation time in minutes
    #[serde(default)]
    pub prep_time_mins: i64,

    /// Cooking time in minutes
    #[serde(default)]
    pub cook_time_mins: i64,

    /// How many servings the quantities yield
    pub servings: i64,

    /// Where the recipe came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl RecipeDraft {
    /// Create an empty draft with a title and serving count
    pub fn new(title: impl Into<String>, servings: i64) -> Self {
        Self {
            title: title.into(),
            description: None,
            ingredients: Vec::new(),
            instructions: Vec::new(),
            prep_time_mins: 0,
            cook_time_mins: 0,
            servings,
            source_url: None,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append an ingredient
    pub fn with_ingredient(mut self, ingredient: Ingredient) -> Self {
        self.ingredients.push(ingredient);
        self
    }

    /// Append an instruction step, numbered automatically
    pub fn with_step(mut self, text: impl Into<String>) -> Self {
        let step = self.instructions.len() as i64 + 1;
        self.instructions.push(Instruction::new(step, text));
        self
    }

    /// Set preparation and cooking times
    pub fn with_times(mut self, prep_time_mins: i64, cook_time_mins: i64) -> Self {
        self.prep_time_mins = prep_time_mins;
        self.cook_time_mins = cook_time_mins;
        self
    }

    /// Set the source URL
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    /// Check the draft is storable
    ///
    /// A version row is immutable once written, so every rule is
    /// enforced here before anything reaches the database.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::InvalidInput("Recipe title cannot be empty".to_string()));
        }
        if self.ingredients.is_empty() {
            return Err(Error::InvalidInput(
                "Recipe needs at least one ingredient".to_string(),
            ));
        }
        if self.instructions.is_empty() {
            return Err(Error::InvalidInput(
                "Recipe needs at least one instruction step".to_string(),
            ));
        }
        if self.servings <= 0 {
            return Err(Error::InvalidInput(format!(
                "Servings must be positive, got {}",
                self.servings
            )));
        }
        if self.prep_time_mins < 0 || self.cook_time_mins < 0 {
            return Err(Error::InvalidInput("Times cannot be negative".to_string()));
        }

        for ingredient in &self.ingredients {
            if ingredient.name.trim().is_empty() {
                return Err(Error::InvalidInput("Ingredient name cannot be empty".to_string()));
            }
            if !ingredient.quantity.is_finite() || ingredient.quantity <= 0.0 {
                return Err(Error::InvalidInput(format!(
                    "Ingredient '{}' needs a positive quantity, got {}",
                    ingredient.name, ingredient.quantity
                )));
            }
        }

        for (i, instruction) in self.instructions.iter().enumerate() {
            let expected = i as i64 + 1;
            if instruction.step != expected {
                return Err(Error::InvalidInput(format!(
                    "Instruction steps must run 1, 2, 3... without gaps; step {} found where {} was expected",
                    instruction.step, expected
                )));
            }
            if instruction.text.trim().is_empty() {
                return Err(Error::InvalidInput(format!(
                    "Instruction step {} has no text",
                    instruction.step
                )));
            }
        }

        Ok(())
    }
}

/// Lightweight recipe info for listing
///
/// Joins the identity row with its current version's title so listings
/// need a single query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeSummary {
    /// Recipe ID
    pub id: Uuid,

    /// Title of the current version
    pub title: String,

    /// Current (highest) version number
    pub current_version: i64,

    /// Duplication parent, if any
    pub parent_recipe_id: Option<Uuid>,

    /// When archived, if archived
    pub archived_at: Option<DateTime<Utc>>,

    /// When created
    pub created_at: DateTime<Utc>,
}
