//! User model and JWT claims

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::{AccountStatus, Role};

/// User record from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Create user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(length(min = 6, max = 100))]
    pub password: String,
    #[validate(length(min = 2, max = 100))]
    pub full_name: String,
    pub role: Role,
}

/// Account status patch request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAccountStatus {
    pub status: AccountStatus,
}

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub user_id: i32,
    pub role: Role,
}

/// JWT claims carried by authenticated requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    /// Username
    pub sub: String,
    pub user_id: i32,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Staff-or-admin gate for verification and return endpoints
    pub fn require_staff(&self) -> crate::error::AppResult<()> {
        if self.role.is_staff() {
            Ok(())
        } else {
            Err(crate::error::AppError::Forbidden(
                "Staff access required".to_string(),
            ))
        }
    }

    /// Admin-only gate for account management and fine waivers
    pub fn require_admin(&self) -> crate::error::AppResult<()> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(crate::error::AppError::Forbidden(
                "Administrator access required".to_string(),
            ))
        }
    }

    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        let data = decode::<UserClaims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(data.claims)
    }
}
