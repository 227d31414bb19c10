//! User management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        activity::ActivityLog,
        user::{CreateUser, UpdateAccountStatus, User},
    },
    AppState,
};

use super::AuthenticatedUser;

#[derive(Deserialize, IntoParams)]
pub struct ActivityQuery {
    /// Narrow to one account
    pub user_id: Option<i32>,
    /// Maximum entries to return (default 100)
    pub limit: Option<i64>,
}

/// List user accounts
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All accounts", body = Vec<User>),
        (status = 403, description = "Staff access required")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<User>>> {
    claims.require_staff()?;
    let users = state.services.users.list().await?;
    Ok(Json(users))
}

/// Get one user account
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Account", body = User),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<User>> {
    claims.require_staff()?;
    let user = state.services.users.get(id).await?;
    Ok(Json(user))
}

/// Create a user account
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = CreateUser,
    responses(
        (status = 201, description = "Account created", body = User),
        (status = 403, description = "Administrator access required"),
        (status = 409, description = "Username already taken")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    claims.require_admin()?;
    request.validate()?;
    let user = state.services.users.create(claims.user_id, &request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Block, unblock or deactivate an account
#[utoipa::path(
    patch,
    path = "/users/{id}/status",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateAccountStatus,
    responses(
        (status = 200, description = "Account updated", body = User),
        (status = 403, description = "Administrator access required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user_status(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateAccountStatus>,
) -> AppResult<Json<User>> {
    claims.require_admin()?;
    let user = state
        .services
        .users
        .set_status(claims.user_id, id, request.status)
        .await?;
    Ok(Json(user))
}

/// Move an account to the recycle bin
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 204, description = "Account deleted"),
        (status = 400, description = "Account has open loans or is your own"),
        (status = 403, description = "Administrator access required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;
    state.services.users.delete(claims.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List recycle bin contents
#[utoipa::path(
    get,
    path = "/users/recycle-bin",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Soft-deleted accounts", body = Vec<User>),
        (status = 403, description = "Administrator access required")
    )
)]
pub async fn list_deleted_users(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<User>>> {
    claims.require_admin()?;
    let users = state.services.users.list_deleted().await?;
    Ok(Json(users))
}

/// Restore an account from the recycle bin
#[utoipa::path(
    post,
    path = "/users/{id}/restore",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Account restored", body = User),
        (status = 403, description = "Administrator access required"),
        (status = 404, description = "User not found in recycle bin")
    )
)]
pub async fn restore_user(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<User>> {
    claims.require_admin()?;
    let user = state.services.users.restore(claims.user_id, id).await?;
    Ok(Json(user))
}

/// Permanently remove an account from the recycle bin
#[utoipa::path(
    delete,
    path = "/users/{id}/purge",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 204, description = "Account removed"),
        (status = 400, description = "Account still has loan or activity history"),
        (status = 403, description = "Administrator access required"),
        (status = 404, description = "User not found in recycle bin")
    )
)]
pub async fn purge_user(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;
    state.services.users.purge(claims.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Recent audit trail
#[utoipa::path(
    get,
    path = "/activity",
    tag = "users",
    security(("bearer_auth" = [])),
    params(ActivityQuery),
    responses(
        (status = 200, description = "Recent activity", body = Vec<ActivityLog>),
        (status = 403, description = "Staff access required")
    )
)]
pub async fn list_activity(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<ActivityQuery>,
) -> AppResult<Json<Vec<ActivityLog>>> {
    claims.require_staff()?;
    let entries = state
        .services
        .users
        .recent_activity(query.user_id, query.limit.unwrap_or(100).clamp(1, 500))
        .await?;
    Ok(Json(entries))
}
