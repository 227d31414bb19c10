//! Loans repository for database operations
//!
//! Every multi-row transition (approve, return) runs in a single sqlx
//! transaction with status guards in the UPDATE statements, so concurrent
//! transitions on the same loan resolve to exactly one winner and stock can
//! never be decremented without the matching status change.

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{EquipmentCondition, FineStatus},
        loan::{Loan, LoanDetails, SeverelyOverdueLoan},
        return_record::ReturnRecord,
    },
};

const DETAILS_SELECT: &str = r#"
    SELECT l.id, l.code, l.user_id, u.full_name AS borrower_name,
           l.equipment_id, e.name AS equipment_name, e.code AS equipment_code,
           l.status, l.requested_at, l.borrowed_at, l.due_at
    FROM loans l
    JOIN users u ON u.id = l.user_id
    JOIN equipment e ON e.id = l.equipment_id
"#;

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// Get loan with borrower and equipment names
    pub async fn get_details(&self, id: i32) -> AppResult<LoanDetails> {
        sqlx::query_as::<_, LoanDetails>(&format!("{} WHERE l.id = $1", DETAILS_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// List all loans, newest first
    pub async fn list(&self) -> AppResult<Vec<LoanDetails>> {
        let rows = sqlx::query_as::<_, LoanDetails>(&format!(
            "{} ORDER BY l.requested_at DESC",
            DETAILS_SELECT
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// List loans of one borrower, newest first
    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<LoanDetails>> {
        let rows = sqlx::query_as::<_, LoanDetails>(&format!(
            "{} WHERE l.user_id = $1 ORDER BY l.requested_at DESC",
            DETAILS_SELECT
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Active loans past their due date, most overdue first
    pub async fn list_overdue(&self, now: DateTime<Utc>) -> AppResult<Vec<LoanDetails>> {
        let rows = sqlx::query_as::<_, LoanDetails>(&format!(
            "{} WHERE l.status = 'ACTIVE' AND l.due_at < $1 ORDER BY l.due_at",
            DETAILS_SELECT
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Count of one borrower's loans awaiting decision or currently out
    pub async fn count_open_for_user(&self, user_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE user_id = $1 AND status IN ('PENDING', 'ACTIVE')",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Whether the borrower already has an open loan on this equipment
    pub async fn has_open_for_equipment(&self, user_id: i32, equipment_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM loans
                WHERE user_id = $1 AND equipment_id = $2 AND status IN ('PENDING', 'ACTIVE')
            )
            "#,
        )
        .bind(user_id)
        .bind(equipment_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Whether any borrower has an open loan on this equipment
    pub async fn has_any_open_for_equipment(&self, equipment_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM loans
                WHERE equipment_id = $1 AND status IN ('PENDING', 'ACTIVE')
            )
            "#,
        )
        .bind(equipment_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Insert a PENDING loan. A unique-violation on the code surfaces as
    /// Conflict so the service can retry with a fresh code.
    pub async fn create(
        &self,
        code: &str,
        user_id: i32,
        equipment_id: i32,
        reason: &str,
        purpose: Option<&str>,
    ) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (code, user_id, equipment_id, reason, purpose, status)
            VALUES ($1, $2, $3, $4, $5, 'PENDING')
            RETURNING *
            "#,
        )
        .bind(code)
        .bind(user_id)
        .bind(equipment_id)
        .bind(reason)
        .bind(purpose)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict(format!("Loan code {} already exists", code))
            }
            _ => AppError::from(e),
        })
    }

    /// Approve a pending loan: activate it and take one unit of stock, as one
    /// atomic unit. The stock availability is re-checked here because another
    /// approval may have consumed the last unit since the request was made.
    pub async fn approve(
        &self,
        id: i32,
        now: DateTime<Utc>,
        due_at: DateTime<Utc>,
        notes: Option<&str>,
    ) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            UPDATE loans
            SET status = 'ACTIVE', borrowed_at = $1, due_at = $2, staff_notes = $3
            WHERE id = $4 AND status = 'PENDING'
            RETURNING *
            "#,
        )
        .bind(now)
        .bind(due_at)
        .bind(notes)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::Conflict(format!("Loan {} is no longer pending", id)))?;

        let taken = sqlx::query(
            "UPDATE equipment SET stock = stock - 1 WHERE id = $1 AND stock > 0 AND deleted_at IS NULL",
        )
        .bind(loan.equipment_id)
        .execute(&mut *tx)
        .await?;

        if taken.rows_affected() == 0 {
            // Dropping the transaction rolls the activation back
            return Err(AppError::Validation(
                "Equipment stock is no longer available".to_string(),
            ));
        }

        tx.commit().await?;
        Ok(loan)
    }

    /// Reject a pending loan. No stock effect, since none was taken.
    pub async fn reject(&self, id: i32, reason: &str, notes: Option<&str>) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>(
            r#"
            UPDATE loans
            SET status = 'REJECTED', reject_reason = $1, staff_notes = $2
            WHERE id = $3 AND status = 'PENDING'
            RETURNING *
            "#,
        )
        .bind(reason)
        .bind(notes)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::Conflict(format!("Loan {} is no longer pending", id)))
    }

    /// Close an active loan: create the return record, mark the loan
    /// RETURNED, restore stock unless the item is lost, and worsen the
    /// equipment condition per the severity order. One atomic unit.
    #[allow(clippy::too_many_arguments)]
    pub async fn finish_return(
        &self,
        loan_id: i32,
        equipment_id: i32,
        verifier_id: i32,
        returned_at: DateTime<Utc>,
        condition: EquipmentCondition,
        fine_late: i64,
        fine_condition: i64,
        fine_status: FineStatus,
        notes: Option<&str>,
    ) -> AppResult<ReturnRecord> {
        let mut tx = self.pool.begin().await?;

        // Lock the equipment row so the condition merge cannot race another
        // return or an admin condition patch.
        let current_condition: EquipmentCondition = sqlx::query_scalar(
            "SELECT condition FROM equipment WHERE id = $1 FOR UPDATE",
        )
        .bind(equipment_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", equipment_id)))?;

        let updated = sqlx::query(
            "UPDATE loans SET status = 'RETURNED' WHERE id = $1 AND status = 'ACTIVE'",
        )
        .bind(loan_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::Conflict(format!("Loan {} is not active", loan_id)));
        }

        let record = sqlx::query_as::<_, ReturnRecord>(
            r#"
            INSERT INTO returns (loan_id, returned_at, condition_on_return,
                                 fine_amount, fine_late, fine_condition, fine_status,
                                 verifier_id, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(loan_id)
        .bind(returned_at)
        .bind(condition)
        .bind(fine_late + fine_condition)
        .bind(fine_late)
        .bind(fine_condition)
        .bind(fine_status)
        .bind(verifier_id)
        .bind(notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Validation(format!("Loan {} has already been returned", loan_id))
            }
            _ => AppError::from(e),
        })?;

        let restore_stock = condition != EquipmentCondition::Lost;
        let new_condition = if condition.severity() > current_condition.severity() {
            condition
        } else {
            current_condition
        };

        sqlx::query(
            r#"
            UPDATE equipment
            SET stock = stock + CASE WHEN $1 THEN 1 ELSE 0 END, condition = $2
            WHERE id = $3
            "#,
        )
        .bind(restore_stock)
        .bind(new_condition)
        .bind(equipment_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(record)
    }

    /// Active loans overdue past the given cutoff, joined with borrowers who
    /// are not yet blocked. Feed for the blacklist sweeper.
    pub async fn list_severely_overdue(
        &self,
        cutoff: DateTime<Utc>,
    ) -> AppResult<Vec<SeverelyOverdueLoan>> {
        let rows = sqlx::query_as::<_, SeverelyOverdueLoan>(
            r#"
            SELECT l.id AS loan_id, l.code, l.user_id, u.username, l.due_at,
                   e.name AS equipment_name
            FROM loans l
            JOIN users u ON u.id = l.user_id
            JOIN equipment e ON e.id = l.equipment_id
            WHERE l.status = 'ACTIVE' AND l.due_at < $1 AND u.status != 'BLOCKED'
            ORDER BY l.user_id, l.due_at
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Block a borrower and write the audit record, as one atomic unit. The
    /// guard on the current status makes a repeated sweep a no-op.
    pub async fn block_borrower(
        &self,
        user_id: i32,
        audit_detail: &str,
    ) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE users SET status = 'BLOCKED' WHERE id = $1 AND status != 'BLOCKED'",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query(
            "INSERT INTO activity_log (user_id, event_type, detail) VALUES ($1, 'AUTO_BLOCK', $2)",
        )
        .bind(user_id)
        .bind(audit_detail)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }
}
