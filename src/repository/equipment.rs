//! Equipment repository for database operations
//!
//! Stock is deliberately not mutated here: the decrement/increment happen
//! only inside the approval and return transactions in the loans repository,
//! keeping all mutations to the contended counter in one place.

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::EquipmentCondition,
        equipment::{CreateEquipment, Equipment, UpdateEquipment},
    },
};

#[derive(Clone)]
pub struct EquipmentRepository {
    pool: Pool<Postgres>,
}

impl EquipmentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List equipment, excluding soft-deleted rows
    pub async fn list(&self) -> AppResult<Vec<Equipment>> {
        let rows = sqlx::query_as::<_, Equipment>(
            "SELECT * FROM equipment WHERE deleted_at IS NULL ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Get equipment by ID (soft-deleted rows are invisible)
    pub async fn get_by_id(&self, id: i32) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>(
            "SELECT * FROM equipment WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    /// Create equipment with a generated code
    pub async fn create(&self, code: &str, data: &CreateEquipment) -> AppResult<Equipment> {
        let row = sqlx::query_as::<_, Equipment>(
            r#"
            INSERT INTO equipment (code, name, category_id, stock, condition, price)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(code)
        .bind(&data.name)
        .bind(data.category_id)
        .bind(data.stock)
        .bind(data.condition.unwrap_or(EquipmentCondition::Good))
        .bind(data.price)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update equipment fields that were supplied
    pub async fn update(&self, id: i32, data: &UpdateEquipment) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>(
            r#"
            UPDATE equipment SET
                name = COALESCE($1, name),
                category_id = COALESCE($2, category_id),
                stock = COALESCE($3, stock),
                condition = COALESCE($4, condition),
                price = COALESCE($5, price)
            WHERE id = $6 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(data.category_id)
        .bind(data.stock)
        .bind(data.condition)
        .bind(data.price)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    /// Count of live equipment in a category
    pub async fn count_live_in_category(&self, category_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM equipment WHERE category_id = $1 AND deleted_at IS NULL",
        )
        .bind(category_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Soft-delete (recycle bin)
    pub async fn soft_delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE equipment SET deleted_at = $1 WHERE id = $2 AND deleted_at IS NULL",
        )
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Equipment {} not found", id)));
        }
        Ok(())
    }

    /// List soft-deleted equipment (recycle bin contents)
    pub async fn list_deleted(&self) -> AppResult<Vec<Equipment>> {
        let rows = sqlx::query_as::<_, Equipment>(
            "SELECT * FROM equipment WHERE deleted_at IS NOT NULL ORDER BY deleted_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Restore a soft-deleted row
    pub async fn restore(&self, id: i32) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>(
            "UPDATE equipment SET deleted_at = NULL WHERE id = $1 AND deleted_at IS NOT NULL RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found in recycle bin", id)))
    }

    /// Permanently remove a soft-deleted row. Equipment with loan history
    /// cannot be purged.
    pub async fn purge(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM equipment WHERE id = $1 AND deleted_at IS NOT NULL")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                    AppError::Validation(format!(
                        "Equipment {} still has loan history and cannot be purged",
                        id
                    ))
                }
                _ => AppError::from(e),
            })?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Equipment {} not found in recycle bin", id)));
        }
        Ok(())
    }
}
