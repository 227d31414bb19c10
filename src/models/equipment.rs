//! Equipment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::EquipmentCondition;

/// Equipment record. `stock` is the count of units currently available for
/// lending; it is only ever mutated inside the approval and return
/// transactions of the loan engine, or by an explicit admin stock patch.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Equipment {
    pub id: i32,
    /// Unique human-readable code, e.g. ALT-4F2KQ
    pub code: String,
    pub name: String,
    pub category_id: i32,
    pub stock: i32,
    pub condition: EquipmentCondition,
    /// Replacement price in whole rupiah; charged in full on a lost return
    pub price: i64,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Create equipment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEquipment {
    #[validate(length(min = 2, max = 100))]
    pub name: String,
    pub category_id: i32,
    #[validate(range(min = 0))]
    pub stock: i32,
    pub condition: Option<EquipmentCondition>,
    #[validate(range(min = 0))]
    pub price: i64,
}

/// Update equipment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateEquipment {
    #[validate(length(min = 2, max = 100))]
    pub name: Option<String>,
    pub category_id: Option<i32>,
    #[validate(range(min = 0))]
    pub stock: Option<i32>,
    pub condition: Option<EquipmentCondition>,
    #[validate(range(min = 0))]
    pub price: Option<i64>,
}
