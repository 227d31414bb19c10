//! Loan model and request types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::{LoanStatus, VerifyAction};

/// Loan record from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i32,
    /// Unique human-readable code, e.g. PJM-20250825-X4K2Q
    pub code: String,
    pub user_id: i32,
    pub equipment_id: i32,
    pub reason: String,
    pub purpose: Option<String>,
    pub status: LoanStatus,
    pub requested_at: DateTime<Utc>,
    /// Set when staff approves
    pub borrowed_at: Option<DateTime<Utc>>,
    /// Set when staff approves; shifted by an approved extension
    pub due_at: Option<DateTime<Utc>>,
    pub reject_reason: Option<String>,
    pub staff_notes: Option<String>,
}

/// Loan joined with borrower and equipment names for listings
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct LoanDetails {
    pub id: i32,
    pub code: String,
    pub user_id: i32,
    pub borrower_name: String,
    pub equipment_id: i32,
    pub equipment_name: String,
    pub equipment_code: String,
    pub status: LoanStatus,
    pub requested_at: DateTime<Utc>,
    pub borrowed_at: Option<DateTime<Utc>>,
    pub due_at: Option<DateTime<Utc>>,
}

/// Overdue loan row with its computed day count, for staff listings
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OverdueLoan {
    pub loan: LoanDetails,
    pub days_overdue: i64,
}

/// Row fed to the blacklist sweeper: an active loan past the severe-overdue
/// cutoff whose borrower is not yet blocked
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SeverelyOverdueLoan {
    pub loan_id: i32,
    pub code: String,
    pub user_id: i32,
    pub username: String,
    pub due_at: Option<DateTime<Utc>>,
    pub equipment_name: String,
}

/// Borrower's loan submission
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubmitLoan {
    pub equipment_id: i32,
    #[validate(length(min = 10, max = 1000, message = "reason must be 10 to 1000 characters"))]
    pub reason: String,
    #[validate(length(max = 1000))]
    pub purpose: Option<String>,
}

/// Staff decision on a pending loan
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerifyLoan {
    pub action: VerifyAction,
    #[validate(range(min = 1, max = 30))]
    pub duration_days: Option<i64>,
    #[validate(length(max = 1000))]
    pub reject_reason: Option<String>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}
