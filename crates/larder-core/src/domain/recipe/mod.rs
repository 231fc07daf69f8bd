//! Recipe versioning
//!
//! A recipe is an identity row plus an append-only chain of immutable
//! version snapshots. Edits, restores and duplicate seeds all append;
//! nothing ever rewrites history.
//!
//! # Architecture
//!
//! - `recipe` - `Recipe`, `RecipeVersion`, `RecipeDraft` and friends
//! - `repository` - Database operations, including the transactional
//!   version append
//! - `store` - `VersionStore`, the service every edit path goes through
//!
//! # Example
//!
//! ```ignore
//! use larder_core::domain::recipe::{RecipeDraft, VersionStore};
//!
//! let store = VersionStore::new(db.pool().clone());
//! let recipe = store.create(&draft).await?;
//! let v2 = store.update(recipe.id, &edited).await?;
//! let history = store.get_history(recipe.id).await?;
//! ```

pub mod recipe;
pub mod repository;
pub mod store;

pub use recipe::{Ingredient, Instruction, Recipe, RecipeDraft, RecipeSummary, RecipeVersion};
pub use repository::RecipeRepository;
pub use store::VersionStore;
