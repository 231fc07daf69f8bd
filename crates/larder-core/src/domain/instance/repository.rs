//! Instance repository for database operations
//!
//! Instance rows are written once at capture. The only columns that
//! change afterwards are the cook-session link; photos append as child
//! rows so the captured content itself is never rewritten.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::instance::RecipeInstance;
use crate::error::{Error, Result};
use crate::scaling::UnitSystem;

/// Repository for cooking instance database operations
#[derive(Debug, Clone)]
pub struct InstanceRepository {
    pool: SqlitePool,
}

impl InstanceRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ========== Instances ==========

    /// Save a newly captured instance
    pub async fn save(&self, instance: &RecipeInstance) -> Result<()> {
        let modifications = serde_json::to_string(&instance.modifications)
            .map_err(|e| Error::Parse(format!("Could not encode modifications: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO recipe_instances (
                id, recipe_id, recipe_version,
                scale_factor, unit_system, servings,
                notes, modifications, cook_session_id, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(instance.id.to_string())
        .bind(instance.recipe_id.to_string())
        .bind(instance.recipe_version)
        .bind(instance.scale_factor)
        .bind(instance.unit_system.as_str())
        .bind(instance.servings)
        .bind(&instance.notes)
        .bind(&modifications)
        .bind(&instance.cook_session_id)
        .bind(instance.created_at)
        .execute(&self.pool)
        .await
        .map_err(Error::DatabaseError)?;

        Ok(())
    }

    /// Get an instance by ID, photos included
    pub async fn get(&self, instance_id: Uuid) -> Result<Option<RecipeInstance>> {
        let row: Option<InstanceRow> = sqlx::query_as(
            r#"
            SELECT id, recipe_id, recipe_version,
                   scale_factor, unit_system, servings,
                   notes, modifications, cook_session_id, created_at
            FROM recipe_instances
            WHERE id = ?
            "#,
        )
        .bind(instance_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::DatabaseError)?;

        match row {
            Some(row) => {
                let photos = self.get_photos(instance_id).await?;
                Ok(Some(row.into_instance(photos)?))
            }
            None => Ok(None),
        }
    }

    /// List every instance of a recipe, newest first
    pub async fn list_for_recipe(&self, recipe_id: Uuid) -> Result<Vec<RecipeInstance>> {
        let rows: Vec<InstanceRow> = sqlx::query_as(
            r#"
            SELECT id, recipe_id, recipe_version,
                   scale_factor, unit_system, servings,
                   notes, modifications, cook_session_id, created_at
            FROM recipe_instances
            WHERE recipe_id = ?
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(recipe_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::DatabaseError)?;

        let mut instances = Vec::with_capacity(rows.len());
        for row in rows {
            let id = Uuid::parse_str(&row.id)
                .map_err(|e| Error::Parse(format!("Invalid instance ID: {}", e)))?;
            let photos = self.get_photos(id).await?;
            instances.push(row.into_instance(photos)?);
        }
        Ok(instances)
    }

    /// Point an instance at a cook session
    ///
    /// Returns false when no such instance exists.
    pub async fn set_cook_session(&self, instance_id: Uuid, cook_session_id: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE recipe_instances SET cook_session_id = ? WHERE id = ?
            "#,
        )
        .bind(cook_session_id)
        .bind(instance_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(Error::DatabaseError)?;

        Ok(result.rows_affected() > 0)
    }

    /// Count all instances
    pub async fn count_instances(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipe_instances")
            .fetch_one(&self.pool)
            .await
            .map_err(Error::DatabaseError)?;
        Ok(count)
    }

    // ========== Photos ==========

    /// Append a photo reference to an instance
    pub async fn add_photo(&self, instance_id: Uuid, photo_id: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO instance_photos (id, instance_id, photo_id, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(instance_id.to_string())
        .bind(photo_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::DatabaseError)?;

        Ok(())
    }

    /// Get an instance's photo references in append order
    pub async fn get_photos(&self, instance_id: Uuid) -> Result<Vec<String>> {
        let photos: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT photo_id
            FROM instance_photos
            WHERE instance_id = ?
            ORDER BY created_at ASC, rowid ASC
            "#,
        )
        .bind(instance_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::DatabaseError)?;

        Ok(photos)
    }
}

/// Database row for a cooking instance
#[derive(sqlx::FromRow)]
struct InstanceRow {
    id: String,
    recipe_id: String,
    recipe_version: i64,
    scale_factor: f64,
    unit_system: String,
    servings: i64,
    notes: Option<String>,
    modifications: String,
    cook_session_id: Option<String>,
    created_at: DateTime<Utc>,
}

impl InstanceRow {
    fn into_instance(self, photo_ids: Vec<String>) -> Result<RecipeInstance> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| Error::Parse(format!("Invalid instance ID: {}", e)))?;
        let recipe_id = Uuid::parse_str(&self.recipe_id)
            .map_err(|e| Error::Parse(format!("Invalid recipe ID: {}", e)))?;
        let unit_system = UnitSystem::from_str(&self.unit_system)
            .ok_or_else(|| Error::Parse(format!("Invalid unit system: {}", self.unit_system)))?;
        let modifications = serde_json::from_str(&self.modifications)
            .map_err(|e| Error::Parse(format!("Invalid modifications JSON: {}", e)))?;

        Ok(RecipeInstance {
            id,
            recipe_id,
            recipe_version: self.recipe_version,
            scale_factor: self.scale_factor,
            unit_system,
            servings: self.servings,
            notes: self.notes,
            modifications,
            photo_ids,
            cook_session_id: self.cook_session_id,
            created_at: self.created_at,
        })
    }
}
