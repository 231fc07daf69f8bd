//! Cooking instance snapshots
//!
//! When the user cooks a recipe, an instance freezes which version they
//! cooked, at what scale, in which unit system, and what they changed
//! on the fly. Reconstruction replays those choices against the frozen
//! version, so the exact quantities of any past cook stay reproducible
//! no matter how the recipe evolves afterwards.
//!
//! # Architecture
//!
//! - `instance` - `RecipeInstance`, `InstanceDraft`,
//!   `IngredientModification`, `ReconstructedRecipe`
//! - `repository` - Database operations, photos as append-only child rows
//! - `manager` - `InstanceManager`, capture and reconstruction
//!
//! # Example
//!
//! ```ignore
//! use larder_core::domain::instance::{InstanceDraft, InstanceManager};
//!
//! let manager = InstanceManager::new(db.pool().clone());
//! let instance = manager.create(recipe_id, &InstanceDraft::new().with_scale(2.0)).await?;
//! let exact = manager.reconstruct(instance.id).await?;
//! ```

pub mod instance;
pub mod manager;
pub mod repository;

pub use instance::{IngredientModification, InstanceDraft, RecipeInstance, ReconstructedRecipe};
pub use manager::InstanceManager;
pub use repository::InstanceRepository;
