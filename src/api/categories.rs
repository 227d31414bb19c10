//! Equipment category endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::category::{Category, CreateCategory},
    AppState,
};

use super::AuthenticatedUser;

/// List categories
#[utoipa::path(
    get,
    path = "/categories",
    tag = "categories",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All categories", body = Vec<Category>)
    )
)]
pub async fn list_categories(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Category>>> {
    let categories = state.services.categories.list().await?;
    Ok(Json(categories))
}

/// Create a category
#[utoipa::path(
    post,
    path = "/categories",
    tag = "categories",
    security(("bearer_auth" = [])),
    request_body = CreateCategory,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 403, description = "Staff access required")
    )
)]
pub async fn create_category(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateCategory>,
) -> AppResult<(StatusCode, Json<Category>)> {
    claims.require_staff()?;
    request.validate()?;
    let category = state
        .services
        .categories
        .create(claims.user_id, &request)
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Move a category to the recycle bin
#[utoipa::path(
    delete,
    path = "/categories/{id}",
    tag = "categories",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 400, description = "Category still holds equipment"),
        (status = 404, description = "Category not found")
    )
)]
pub async fn delete_category(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_staff()?;
    state.services.categories.delete(claims.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List recycle bin contents
#[utoipa::path(
    get,
    path = "/categories/recycle-bin",
    tag = "categories",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Soft-deleted categories", body = Vec<Category>),
        (status = 403, description = "Staff access required")
    )
)]
pub async fn list_deleted_categories(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Category>>> {
    claims.require_staff()?;
    let categories = state.services.categories.list_deleted().await?;
    Ok(Json(categories))
}

/// Restore a category from the recycle bin
#[utoipa::path(
    post,
    path = "/categories/{id}/restore",
    tag = "categories",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category restored", body = Category),
        (status = 404, description = "Category not found in recycle bin")
    )
)]
pub async fn restore_category(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Category>> {
    claims.require_staff()?;
    let category = state.services.categories.restore(claims.user_id, id).await?;
    Ok(Json(category))
}

/// Permanently remove a category from the recycle bin
#[utoipa::path(
    delete,
    path = "/categories/{id}/purge",
    tag = "categories",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Category removed"),
        (status = 400, description = "Category still holds equipment"),
        (status = 403, description = "Administrator access required"),
        (status = 404, description = "Category not found in recycle bin")
    )
)]
pub async fn purge_category(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;
    state.services.categories.purge(claims.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
