//! Crate-wide error type
//!
//! Messages name the thing that failed and, where it helps, the command
//! that shows the user more. Codes group errors into stable bands that
//! scripts can match on.

use thiserror::Error;

/// Shorthand for results carrying [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Everything larder-core can fail with.
#[derive(Error, Debug)]
pub enum Error {
    // Entity errors (E001-E099)
    #[error("Recipe '{0}' not found. Run `larder list --all` to see all recipes.")]
    RecipeNotFound(String),

    #[error("Recipe '{0}' has no version {1}. Run `larder history {0}` to see its versions.")]
    VersionNotFound(String, i64),

    #[error("Instance '{0}' not found. Run `larder cook list <recipe-id>` to see recorded cooks.")]
    InstanceNotFound(String),

    // Concurrency errors (E100-E199)
    #[error("Recipe changed underneath you: expected version {expected}, found {actual}. Reload and edit again.")]
    VersionConflict { expected: i64, actual: i64 },

    // Database errors (E400-E499)
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Stored data could not be read: {0}")]
    Parse(String),

    // Config errors (E600-E699)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // Input errors (E800-E899)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Generic errors
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Stable code for scripts and logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::RecipeNotFound(_) => "E001",
            Self::VersionNotFound(..) => "E002",
            Self::InstanceNotFound(_) => "E003",
            Self::VersionConflict { .. } => "E100",
            Self::DatabaseError(_) => "E400",
            Self::Parse(_) => "E401",
            Self::ConfigError(_) => "E600",
            Self::InvalidInput(_) => "E800",
            Self::Other(_) | Self::Io(_) => "E9999",
        }
    }

    /// Command the user can run to get unstuck, when one exists.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::RecipeNotFound(_) => Some("larder list --all".to_string()),
            Self::VersionNotFound(id, _) => Some(format!("larder history {}", id)),
            Self::InstanceNotFound(_) => Some("larder cook list <recipe-id>".to_string()),
            Self::VersionConflict { actual, .. } => {
                Some(format!("larder edit <id> --expect-version {}", actual))
            }
            Self::ConfigError(_) => Some("larder config list".to_string()),
            _ => None,
        }
    }
}
