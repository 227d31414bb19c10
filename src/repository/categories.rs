//! Categories repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::category::{Category, CreateCategory},
};

#[derive(Clone)]
pub struct CategoriesRepository {
    pool: Pool<Postgres>,
}

impl CategoriesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List categories, excluding soft-deleted rows
    pub async fn list(&self) -> AppResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE deleted_at IS NULL ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Get category by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Category> {
        sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))
    }

    /// Create category
    pub async fn create(&self, data: &CreateCategory) -> AppResult<Category> {
        let row = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name, description) VALUES ($1, $2) RETURNING *",
        )
        .bind(&data.name)
        .bind(&data.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Soft-delete a category (recycle bin)
    pub async fn soft_delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE categories SET deleted_at = $1 WHERE id = $2 AND deleted_at IS NULL",
        )
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Category {} not found", id)));
        }
        Ok(())
    }

    /// List soft-deleted categories (recycle bin contents)
    pub async fn list_deleted(&self) -> AppResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE deleted_at IS NOT NULL ORDER BY deleted_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Restore a soft-deleted category
    pub async fn restore(&self, id: i32) -> AppResult<Category> {
        sqlx::query_as::<_, Category>(
            "UPDATE categories SET deleted_at = NULL WHERE id = $1 AND deleted_at IS NOT NULL RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Category {} not found in recycle bin", id)))
    }

    /// Permanently remove a soft-deleted category. Categories that still
    /// hold equipment cannot be purged.
    pub async fn purge(&self, id: i32) -> AppResult<()> {
        let result =
            sqlx::query("DELETE FROM categories WHERE id = $1 AND deleted_at IS NOT NULL")
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(|e| match &e {
                    sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                        AppError::Validation(format!(
                            "Category {} still holds equipment and cannot be purged",
                            id
                        ))
                    }
                    _ => AppError::from(e),
                })?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Category {} not found in recycle bin",
                id
            )));
        }
        Ok(())
    }
}
