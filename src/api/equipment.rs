//! Equipment inventory endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::equipment::{CreateEquipment, Equipment, UpdateEquipment},
    AppState,
};

use super::AuthenticatedUser;

/// List equipment
#[utoipa::path(
    get,
    path = "/equipment",
    tag = "equipment",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All live equipment", body = Vec<Equipment>)
    )
)]
pub async fn list_equipment(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Equipment>>> {
    let equipment = state.services.equipment.list().await?;
    Ok(Json(equipment))
}

/// Get one equipment item
#[utoipa::path(
    get,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Equipment", body = Equipment),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn get_equipment(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Equipment>> {
    let equipment = state.services.equipment.get(id).await?;
    Ok(Json(equipment))
}

/// Add equipment to the inventory
#[utoipa::path(
    post,
    path = "/equipment",
    tag = "equipment",
    security(("bearer_auth" = [])),
    request_body = CreateEquipment,
    responses(
        (status = 201, description = "Equipment created", body = Equipment),
        (status = 403, description = "Staff access required"),
        (status = 404, description = "Category not found")
    )
)]
pub async fn create_equipment(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateEquipment>,
) -> AppResult<(StatusCode, Json<Equipment>)> {
    claims.require_staff()?;
    request.validate()?;
    let equipment = state
        .services
        .equipment
        .create(claims.user_id, &request)
        .await?;
    Ok((StatusCode::CREATED, Json(equipment)))
}

/// Update equipment fields
#[utoipa::path(
    put,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Equipment ID")),
    request_body = UpdateEquipment,
    responses(
        (status = 200, description = "Equipment updated", body = Equipment),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn update_equipment(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateEquipment>,
) -> AppResult<Json<Equipment>> {
    claims.require_staff()?;
    request.validate()?;
    let equipment = state
        .services
        .equipment
        .update(claims.user_id, id, &request)
        .await?;
    Ok(Json(equipment))
}

/// Move equipment to the recycle bin
#[utoipa::path(
    delete,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Equipment ID")),
    responses(
        (status = 204, description = "Equipment deleted"),
        (status = 400, description = "Equipment has open loans"),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn delete_equipment(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_staff()?;
    state.services.equipment.delete(claims.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List recycle bin contents
#[utoipa::path(
    get,
    path = "/equipment/recycle-bin",
    tag = "equipment",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Soft-deleted equipment", body = Vec<Equipment>),
        (status = 403, description = "Staff access required")
    )
)]
pub async fn list_deleted_equipment(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Equipment>>> {
    claims.require_staff()?;
    let equipment = state.services.equipment.list_deleted().await?;
    Ok(Json(equipment))
}

/// Restore equipment from the recycle bin
#[utoipa::path(
    post,
    path = "/equipment/{id}/restore",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Equipment restored", body = Equipment),
        (status = 404, description = "Equipment not found in recycle bin")
    )
)]
pub async fn restore_equipment(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Equipment>> {
    claims.require_staff()?;
    let equipment = state.services.equipment.restore(claims.user_id, id).await?;
    Ok(Json(equipment))
}

/// Permanently remove equipment from the recycle bin
#[utoipa::path(
    delete,
    path = "/equipment/{id}/purge",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Equipment ID")),
    responses(
        (status = 204, description = "Equipment removed"),
        (status = 403, description = "Administrator access required"),
        (status = 404, description = "Equipment not found in recycle bin")
    )
)]
pub async fn purge_equipment(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;
    state.services.equipment.purge(claims.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
