//! Return processing and fine settlement endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::return_record::{ProcessReturn, ReturnRecord, UpdateFineStatus},
    AppState,
};

use super::AuthenticatedUser;

/// List return records
#[utoipa::path(
    get,
    path = "/returns",
    tag = "returns",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All returns", body = Vec<ReturnRecord>),
        (status = 403, description = "Staff access required")
    )
)]
pub async fn list_returns(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<ReturnRecord>>> {
    claims.require_staff()?;
    let returns = state.services.returns.list().await?;
    Ok(Json(returns))
}

/// Get one return record
#[utoipa::path(
    get,
    path = "/returns/{id}",
    tag = "returns",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Return ID")),
    responses(
        (status = 200, description = "Return record", body = ReturnRecord),
        (status = 404, description = "Return not found")
    )
)]
pub async fn get_return(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ReturnRecord>> {
    claims.require_staff()?;
    let record = state.services.returns.get(id).await?;
    Ok(Json(record))
}

/// Process the return of an active loan
#[utoipa::path(
    post,
    path = "/returns",
    tag = "returns",
    security(("bearer_auth" = [])),
    request_body = ProcessReturn,
    responses(
        (status = 201, description = "Return processed", body = ReturnRecord),
        (status = 400, description = "Loan not active or already returned"),
        (status = 403, description = "Staff access required"),
        (status = 409, description = "Another return won the race")
    )
)]
pub async fn process_return(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<ProcessReturn>,
) -> AppResult<(StatusCode, Json<ReturnRecord>)> {
    claims.require_staff()?;
    request.validate()?;
    let record = state
        .services
        .loans
        .process_return(claims.user_id, &request)
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Settle or waive the fine on a return
#[utoipa::path(
    patch,
    path = "/returns/{id}/fine",
    tag = "returns",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Return ID")),
    request_body = UpdateFineStatus,
    responses(
        (status = 200, description = "Fine updated", body = ReturnRecord),
        (status = 400, description = "No fine, already settled, or reason missing"),
        (status = 403, description = "Waiving requires administrator access"),
        (status = 404, description = "Return not found")
    )
)]
pub async fn update_fine_status(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateFineStatus>,
) -> AppResult<Json<ReturnRecord>> {
    claims.require_staff()?;
    request.validate()?;
    let record = state
        .services
        .returns
        .set_fine_status(claims.user_id, claims.role, id, &request)
        .await?;
    Ok(Json(record))
}
