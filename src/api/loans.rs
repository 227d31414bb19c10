//! Loan lifecycle endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::loan::{Loan, LoanDetails, OverdueLoan, SubmitLoan, VerifyLoan},
    services::sweeper::SweepReport,
    AppState,
};

use super::AuthenticatedUser;

/// List all loans (staff view)
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All loans", body = Vec<LoanDetails>),
        (status = 403, description = "Staff access required")
    )
)]
pub async fn list_loans(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<LoanDetails>>> {
    claims.require_staff()?;
    let loans = state.services.loans.list().await?;
    Ok(Json(loans))
}

/// List the authenticated borrower's own loans
#[utoipa::path(
    get,
    path = "/loans/me",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own loans", body = Vec<LoanDetails>)
    )
)]
pub async fn list_my_loans(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<LoanDetails>>> {
    let loans = state.services.loans.list_for_user(claims.user_id).await?;
    Ok(Json(loans))
}

/// Active loans past their due date, with day counts
#[utoipa::path(
    get,
    path = "/loans/overdue",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Overdue loans", body = Vec<OverdueLoan>),
        (status = 403, description = "Staff access required")
    )
)]
pub async fn list_overdue_loans(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<OverdueLoan>>> {
    claims.require_staff()?;
    let loans = state.services.loans.list_overdue().await?;
    Ok(Json(loans))
}

/// Get one loan
#[utoipa::path(
    get,
    path = "/loans/{id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Loan ID")),
    responses(
        (status = 200, description = "Loan", body = LoanDetails),
        (status = 403, description = "Not your loan"),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn get_loan(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<LoanDetails>> {
    let loan = state.services.loans.get_details(id).await?;
    if !claims.role.is_staff() && loan.user_id != claims.user_id {
        return Err(crate::error::AppError::Forbidden(
            "You can only view your own loans".to_string(),
        ));
    }
    Ok(Json(loan))
}

/// Submit a loan request
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = SubmitLoan,
    responses(
        (status = 201, description = "Loan submitted", body = Loan),
        (status = 400, description = "Rule violation: cap, stock, condition or duplicate"),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn submit_loan(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<SubmitLoan>,
) -> AppResult<(StatusCode, Json<Loan>)> {
    request.validate()?;
    let loan = state.services.loans.submit(claims.user_id, &request).await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

/// Approve or reject a pending loan
#[utoipa::path(
    post,
    path = "/loans/{id}/verify",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Loan ID")),
    request_body = VerifyLoan,
    responses(
        (status = 200, description = "Loan decided", body = Loan),
        (status = 400, description = "Loan not pending, stock gone or reason missing"),
        (status = 403, description = "Staff access required"),
        (status = 409, description = "Another decision won the race")
    )
)]
pub async fn verify_loan(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<VerifyLoan>,
) -> AppResult<Json<Loan>> {
    claims.require_staff()?;
    request.validate()?;
    let loan = state
        .services
        .loans
        .verify(id, claims.user_id, &request)
        .await?;
    Ok(Json(loan))
}

/// Run the overdue/blacklist sweep on demand
#[utoipa::path(
    post,
    path = "/loans/sweep-overdue",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Sweep report", body = SweepReport),
        (status = 403, description = "Administrator access required")
    )
)]
pub async fn sweep_overdue(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<SweepReport>> {
    claims.require_admin()?;
    let report = state
        .services
        .sweeper
        .run_overdue_sweep(chrono::Utc::now())
        .await?;
    Ok(Json(report))
}

/// Cancel a pending loan request
#[utoipa::path(
    post,
    path = "/loans/{id}/cancel",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Loan ID")),
    responses(
        (status = 200, description = "Loan cancelled", body = Loan),
        (status = 400, description = "Loan is not pending"),
        (status = 403, description = "Not your loan")
    )
)]
pub async fn cancel_loan(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Loan>> {
    let loan = state
        .services
        .loans
        .cancel(id, claims.user_id, claims.role)
        .await?;
    Ok(Json(loan))
}
