//! Loan extension endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::ExtensionStatus,
        extension::{Extension, RequestExtension, VerifyExtension},
    },
    AppState,
};

use super::AuthenticatedUser;

#[derive(Deserialize, IntoParams)]
pub struct ExtensionQuery {
    /// Filter by extension status
    pub status: Option<ExtensionStatus>,
}

/// List extension requests
#[utoipa::path(
    get,
    path = "/extensions",
    tag = "extensions",
    security(("bearer_auth" = [])),
    params(ExtensionQuery),
    responses(
        (status = 200, description = "Extension requests", body = Vec<Extension>),
        (status = 403, description = "Staff access required")
    )
)]
pub async fn list_extensions(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<ExtensionQuery>,
) -> AppResult<Json<Vec<Extension>>> {
    claims.require_staff()?;
    let extensions = state.services.extensions.list(query.status).await?;
    Ok(Json(extensions))
}

/// Get one extension request
#[utoipa::path(
    get,
    path = "/extensions/{id}",
    tag = "extensions",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Extension ID")),
    responses(
        (status = 200, description = "Extension", body = Extension),
        (status = 403, description = "Not your extension"),
        (status = 404, description = "Extension not found")
    )
)]
pub async fn get_extension(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Extension>> {
    let extension = state.services.extensions.get(id).await?;
    if !state
        .services
        .extensions
        .can_view(&extension, claims.user_id, claims.role)
    {
        return Err(AppError::Forbidden(
            "You can only view your own extension requests".to_string(),
        ));
    }
    Ok(Json(extension))
}

/// Request an extension on an active loan
#[utoipa::path(
    post,
    path = "/extensions",
    tag = "extensions",
    security(("bearer_auth" = [])),
    request_body = RequestExtension,
    responses(
        (status = 201, description = "Extension requested", body = Extension),
        (status = 400, description = "Outside the window, duplicate, or already extended"),
        (status = 403, description = "Not your loan"),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn request_extension(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<RequestExtension>,
) -> AppResult<(StatusCode, Json<Extension>)> {
    request.validate()?;
    let extension = state
        .services
        .extensions
        .request(claims.user_id, &request)
        .await?;
    Ok((StatusCode::CREATED, Json(extension)))
}

/// Approve or reject a pending extension
#[utoipa::path(
    post,
    path = "/extensions/{id}/verify",
    tag = "extensions",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Extension ID")),
    request_body = VerifyExtension,
    responses(
        (status = 200, description = "Extension decided", body = Extension),
        (status = 400, description = "Extension not pending or reason missing"),
        (status = 403, description = "Staff access required"),
        (status = 409, description = "Another decision won the race")
    )
)]
pub async fn verify_extension(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<VerifyExtension>,
) -> AppResult<Json<Extension>> {
    claims.require_staff()?;
    request.validate()?;
    let extension = state
        .services
        .extensions
        .verify(id, claims.user_id, &request)
        .await?;
    Ok(Json(extension))
}
