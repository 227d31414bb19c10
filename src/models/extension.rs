//! Loan extension model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::{ExtensionStatus, VerifyAction};

/// Extension record from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Extension {
    pub id: i32,
    pub loan_id: i32,
    pub requester_id: i32,
    pub additional_days: i32,
    pub reason: String,
    pub status: ExtensionStatus,
    pub requested_at: DateTime<Utc>,
    pub approver_id: Option<i32>,
    pub decided_at: Option<DateTime<Utc>>,
    pub decision_reason: Option<String>,
}

/// Borrower's extension request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RequestExtension {
    pub loan_id: i32,
    #[validate(range(min = 1))]
    pub additional_days: i32,
    #[validate(length(min = 10, max = 1000, message = "reason must be 10 to 1000 characters"))]
    pub reason: String,
}

/// Staff decision on a pending extension
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerifyExtension {
    pub action: VerifyAction,
    #[validate(length(max = 1000))]
    pub reject_reason: Option<String>,
}
