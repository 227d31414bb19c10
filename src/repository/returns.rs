//! Returns repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{enums::FineStatus, return_record::ReturnRecord},
};

#[derive(Clone)]
pub struct ReturnsRepository {
    pool: Pool<Postgres>,
}

impl ReturnsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get return record by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<ReturnRecord> {
        sqlx::query_as::<_, ReturnRecord>("SELECT * FROM returns WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Return with id {} not found", id)))
    }

    /// Whether a loan already has its return record
    pub async fn exists_for_loan(&self, loan_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM returns WHERE loan_id = $1)",
        )
        .bind(loan_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// List returns, newest first
    pub async fn list(&self) -> AppResult<Vec<ReturnRecord>> {
        let rows = sqlx::query_as::<_, ReturnRecord>(
            "SELECT * FROM returns ORDER BY returned_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Update the settlement state of a fine, appending to notes when given
    pub async fn set_fine_status(
        &self,
        id: i32,
        status: FineStatus,
        appended_note: Option<&str>,
    ) -> AppResult<ReturnRecord> {
        sqlx::query_as::<_, ReturnRecord>(
            r#"
            UPDATE returns
            SET fine_status = $1,
                notes = CASE WHEN $2::text IS NULL THEN notes
                             ELSE TRIM(BOTH E'\n' FROM COALESCE(notes, '') || E'\n' || $2) END
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(status)
        .bind(appended_note)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Return with id {} not found", id)))
    }
}
