//! Activity log repository (audit sink)

use sqlx::{Pool, Postgres};

use crate::{error::AppResult, models::activity::ActivityLog};

#[derive(Clone)]
pub struct ActivityRepository {
    pool: Pool<Postgres>,
}

impl ActivityRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Append an audit entry
    pub async fn log(&self, user_id: i32, event_type: &str, detail: &str) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO activity_log (user_id, event_type, detail) VALUES ($1, $2, $3)",
        )
        .bind(user_id)
        .bind(event_type)
        .bind(detail)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Most recent entries, optionally for one user
    pub async fn list_recent(&self, user_id: Option<i32>, limit: i64) -> AppResult<Vec<ActivityLog>> {
        let rows = match user_id {
            Some(uid) => {
                sqlx::query_as::<_, ActivityLog>(
                    "SELECT * FROM activity_log WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
                )
                .bind(uid)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, ActivityLog>(
                    "SELECT * FROM activity_log ORDER BY created_at DESC LIMIT $1",
                )
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows)
    }
}
