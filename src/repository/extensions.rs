//! Extensions repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{enums::ExtensionStatus, extension::Extension},
};

#[derive(Clone)]
pub struct ExtensionsRepository {
    pool: Pool<Postgres>,
}

impl ExtensionsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get extension by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Extension> {
        sqlx::query_as::<_, Extension>("SELECT * FROM extensions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Extension with id {} not found", id)))
    }

    /// List extensions, newest first, optionally filtered by status
    pub async fn list(&self, status: Option<ExtensionStatus>) -> AppResult<Vec<Extension>> {
        let rows = match status {
            Some(status) => {
                sqlx::query_as::<_, Extension>(
                    "SELECT * FROM extensions WHERE status = $1 ORDER BY requested_at DESC",
                )
                .bind(status)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Extension>(
                    "SELECT * FROM extensions ORDER BY requested_at DESC",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows)
    }

    /// Whether a loan has an extension in the given status
    pub async fn exists_with_status(
        &self,
        loan_id: i32,
        status: ExtensionStatus,
    ) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM extensions WHERE loan_id = $1 AND status = $2)",
        )
        .bind(loan_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Insert a PENDING extension. The partial unique index backs up the
    /// one-pending-per-loan rule under concurrent requests.
    pub async fn create(
        &self,
        loan_id: i32,
        requester_id: i32,
        additional_days: i32,
        reason: &str,
    ) -> AppResult<Extension> {
        sqlx::query_as::<_, Extension>(
            r#"
            INSERT INTO extensions (loan_id, requester_id, additional_days, reason, status)
            VALUES ($1, $2, $3, $4, 'PENDING')
            RETURNING *
            "#,
        )
        .bind(loan_id)
        .bind(requester_id)
        .bind(additional_days)
        .bind(reason)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => AppError::Validation(
                "A pending extension already exists for this loan".to_string(),
            ),
            _ => AppError::from(e),
        })
    }

    /// Approve a pending extension and shift the parent loan's due date, as
    /// one atomic unit. Both status guards must hold or nothing is applied.
    pub async fn approve(
        &self,
        id: i32,
        loan_id: i32,
        additional_days: i32,
        approver_id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<(Extension, DateTime<Utc>)> {
        let mut tx = self.pool.begin().await?;

        let extension = sqlx::query_as::<_, Extension>(
            r#"
            UPDATE extensions
            SET status = 'APPROVED', approver_id = $1, decided_at = $2
            WHERE id = $3 AND status = 'PENDING'
            RETURNING *
            "#,
        )
        .bind(approver_id)
        .bind(now)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::Conflict(format!("Extension {} is no longer pending", id)))?;

        let new_due_at: Option<DateTime<Utc>> = sqlx::query_scalar(
            r#"
            UPDATE loans SET due_at = due_at + make_interval(days => $1)
            WHERE id = $2 AND status = 'ACTIVE' AND due_at IS NOT NULL
            RETURNING due_at
            "#,
        )
        .bind(additional_days)
        .bind(loan_id)
        .fetch_optional(&mut *tx)
        .await?;

        let new_due_at = new_due_at.ok_or_else(|| {
            AppError::Conflict(format!("Loan {} is no longer active", loan_id))
        })?;

        tx.commit().await?;
        Ok((extension, new_due_at))
    }

    /// Reject a pending extension. No loan mutation.
    pub async fn reject(
        &self,
        id: i32,
        approver_id: i32,
        reason: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Extension> {
        sqlx::query_as::<_, Extension>(
            r#"
            UPDATE extensions
            SET status = 'REJECTED', approver_id = $1, decided_at = $2, decision_reason = $3
            WHERE id = $4 AND status = 'PENDING'
            RETURNING *
            "#,
        )
        .bind(approver_id)
        .bind(now)
        .bind(reason)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::Conflict(format!("Extension {} is no longer pending", id)))
    }
}
