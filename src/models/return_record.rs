//! Return record model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::{EquipmentCondition, FineStatus};

/// Return record, created exactly once per loan on ACTIVE -> RETURNED
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ReturnRecord {
    pub id: i32,
    pub loan_id: i32,
    pub returned_at: DateTime<Utc>,
    pub condition_on_return: EquipmentCondition,
    /// Total fine in whole rupiah
    pub fine_amount: i64,
    pub fine_late: i64,
    pub fine_condition: i64,
    pub fine_status: FineStatus,
    pub verifier_id: i32,
    pub notes: Option<String>,
}

/// Staff return submission
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ProcessReturn {
    pub loan_id: i32,
    pub condition: EquipmentCondition,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
    /// Overrides the flat damage rate when staff assesses the damage manually
    #[validate(range(min = 0))]
    pub manual_damage_fine: Option<i64>,
}

/// Fine settlement patch
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateFineStatus {
    pub fine_status: FineStatus,
    #[validate(length(max = 500))]
    pub waive_reason: Option<String>,
}
