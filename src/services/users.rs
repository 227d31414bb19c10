//! User accounts and authentication

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{
        activity::ActivityLog,
        enums::{AccountStatus, ActivityType, Role},
        user::{CreateUser, LoginRequest, LoginResponse, User, UserClaims},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    auth: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, auth: AuthConfig) -> Self {
        Self { repository, auth }
    }

    /// Authenticate and issue a JWT. Blocked and inactive accounts cannot
    /// log in; the error does not reveal which part of the check failed.
    pub async fn login(&self, request: &LoginRequest) -> AppResult<LoginResponse> {
        let user = self
            .repository
            .users
            .get_by_username(&request.username)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        verify_password(&request.password, &user.password_hash)?;

        if user.status != AccountStatus::Active {
            return Err(AppError::Forbidden(
                "Your account is blocked or inactive".to_string(),
            ));
        }

        let now = Utc::now();
        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            role: user.role,
            iat: now.timestamp(),
            exp: (now + chrono::Duration::hours(self.auth.jwt_expiration_hours as i64))
                .timestamp(),
        };
        let token = claims
            .create_token(&self.auth.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Token creation failed: {}", e)))?;

        self.audit(user.id, ActivityType::Login, "Logged in").await;

        Ok(LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            user_id: user.id,
            role: user.role,
        })
    }

    pub async fn get(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        self.repository.users.list().await
    }

    /// Admin creates an account with a hashed password
    pub async fn create(&self, actor_id: i32, request: &CreateUser) -> AppResult<User> {
        let password_hash = hash_password(&request.password)?;
        let user = self
            .repository
            .users
            .create(&request.username, &password_hash, &request.full_name, request.role)
            .await?;

        self.audit(
            actor_id,
            ActivityType::CreateUser,
            &format!("Created {} account {}", user.role, user.username),
        )
        .await;
        Ok(user)
    }

    /// Block, unblock or deactivate an account
    pub async fn set_status(
        &self,
        actor_id: i32,
        user_id: i32,
        status: AccountStatus,
    ) -> AppResult<User> {
        let user = self.repository.users.set_status(user_id, status).await?;

        self.audit(
            actor_id,
            ActivityType::UpdateUserStatus,
            &format!("Set account {} to {}", user.username, status),
        )
        .await;
        Ok(user)
    }

    /// Move an account to the recycle bin. Accounts with open loans stay
    /// put, and an administrator cannot delete their own account.
    pub async fn delete(&self, actor_id: i32, user_id: i32) -> AppResult<()> {
        if actor_id == user_id {
            return Err(AppError::Validation(
                "You cannot delete your own account".to_string(),
            ));
        }
        let user = self.repository.users.get_by_id(user_id).await?;
        if self.repository.loans.count_open_for_user(user_id).await? > 0 {
            return Err(AppError::Validation(format!(
                "Account {} has open loans and cannot be deleted",
                user.username
            )));
        }

        self.repository.users.soft_delete(user_id).await?;

        self.audit(
            actor_id,
            ActivityType::DeleteUser,
            &format!("Deleted account {}", user.username),
        )
        .await;
        Ok(())
    }

    pub async fn list_deleted(&self) -> AppResult<Vec<User>> {
        self.repository.users.list_deleted().await
    }

    pub async fn restore(&self, actor_id: i32, user_id: i32) -> AppResult<User> {
        let user = self.repository.users.restore(user_id).await?;

        self.audit(
            actor_id,
            ActivityType::RestoreUser,
            &format!("Restored account {}", user.username),
        )
        .await;
        Ok(user)
    }

    pub async fn purge(&self, actor_id: i32, user_id: i32) -> AppResult<()> {
        self.repository.users.purge(user_id).await?;

        self.audit(
            actor_id,
            ActivityType::DeleteUser,
            &format!("Permanently removed account {}", user_id),
        )
        .await;
        Ok(())
    }

    /// Create the initial administrator on an empty user table so a fresh
    /// deployment can be logged into at all.
    pub async fn bootstrap_admin(&self) -> AppResult<()> {
        if self.repository.users.count().await? > 0 {
            return Ok(());
        }

        let password_hash = hash_password("admin")?;
        self.repository
            .users
            .create("admin", &password_hash, "Administrator", Role::Admin)
            .await?;
        tracing::warn!("Created default admin account (admin/admin); change its password");
        Ok(())
    }

    /// Recent audit trail, optionally narrowed to one account
    pub async fn recent_activity(
        &self,
        user_id: Option<i32>,
        limit: i64,
    ) -> AppResult<Vec<ActivityLog>> {
        self.repository.activity.list_recent(user_id, limit).await
    }

    async fn audit(&self, user_id: i32, event: ActivityType, detail: &str) {
        if let Err(e) = self.repository.activity.log(user_id, event.as_str(), detail).await {
            tracing::warn!("Failed to write activity log: {}", e);
        }
    }
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> AppResult<()> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Stored password hash is invalid: {}", e)))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AppError::Authentication("Invalid username or password".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashing_round_trips_and_rejects_the_wrong_password() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(verify_password("battery staple", &hash).is_err());
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("same input").unwrap();
        let b = hash_password("same input").unwrap();
        assert_ne!(a, b);
    }
}
