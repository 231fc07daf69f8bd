//! Larder Core Library
//!
//! This crate provides the core functionality for Larder, including:
//! - Recipe versioning (append-only edit history with restore)
//! - Heritage (duplication lineage and archival)
//! - Cooking instances (frozen snapshots of how a recipe was cooked)
//! - Scaling and unit conversion (practical kitchen arithmetic)
//! - Storage (SQLite with versioned migrations)
//! - Configuration management

pub mod config;
pub mod domain;
pub mod error;
pub mod scaling;
pub mod storage;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::domain::heritage::{Heritage, HeritageGraph};
    pub use crate::domain::instance::{InstanceDraft, InstanceManager, RecipeInstance};
    pub use crate::domain::recipe::{RecipeDraft, VersionStore};
    pub use crate::error::{Error, Result};
    pub use crate::scaling::{Unit, UnitSystem};
    pub use crate::storage::Database;
}
