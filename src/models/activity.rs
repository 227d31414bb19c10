//! Activity log model

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// Audit trail entry
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ActivityLog {
    pub id: i64,
    pub user_id: i32,
    pub event_type: String,
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}
