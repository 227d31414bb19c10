//! Users repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{AccountStatus, Role},
        user::User,
    },
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID (soft-deleted users are invisible)
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get user by username (login path)
    pub async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE LOWER(username) = LOWER($1) AND deleted_at IS NULL",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// List users
    pub async fn list(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE deleted_at IS NULL ORDER BY full_name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    /// Number of live accounts, used for the first-run admin bootstrap
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Create a user with a pre-hashed password
    pub async fn create(
        &self,
        username: &str,
        password_hash: &str,
        full_name: &str,
        role: Role,
    ) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, full_name, role)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(full_name)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict(format!("Username {} is already taken", username))
            }
            _ => AppError::from(e),
        })?;
        Ok(user)
    }

    /// Set account status
    pub async fn set_status(&self, id: i32, status: AccountStatus) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET status = $1 WHERE id = $2 AND deleted_at IS NULL RETURNING *",
        )
        .bind(status)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Soft-delete an account (recycle bin)
    pub async fn soft_delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE users SET deleted_at = $1 WHERE id = $2 AND deleted_at IS NULL",
        )
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }
        Ok(())
    }

    /// List soft-deleted accounts (recycle bin contents)
    pub async fn list_deleted(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE deleted_at IS NOT NULL ORDER BY deleted_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    /// Restore a soft-deleted account
    pub async fn restore(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET deleted_at = NULL WHERE id = $1 AND deleted_at IS NOT NULL RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("User with id {} not found in recycle bin", id))
        })
    }

    /// Permanently remove a soft-deleted account. Accounts still referenced
    /// by loans or audit entries cannot be purged.
    pub async fn purge(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1 AND deleted_at IS NOT NULL")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                    AppError::Validation(format!(
                        "User {} still has loan or activity history and cannot be purged",
                        id
                    ))
                }
                _ => AppError::from(e),
            })?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "User with id {} not found in recycle bin",
                id
            )));
        }
        Ok(())
    }
}
