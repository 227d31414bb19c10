//! Loan lifecycle service
//!
//! Owns the loan state machine: PENDING -> ACTIVE | REJECTED,
//! ACTIVE -> RETURNED. All stock movement goes through the transactional
//! repository transitions invoked here.

use chrono::{Duration, Utc};
use rand::Rng;

use crate::{
    config::LoanRulesConfig,
    error::{AppError, AppResult},
    models::{
        enums::{AccountStatus, ActivityType, FineStatus, LoanStatus, Role, VerifyAction},
        loan::{Loan, LoanDetails, OverdueLoan, SubmitLoan, VerifyLoan},
        return_record::{ProcessReturn, ReturnRecord},
    },
    repository::Repository,
    services::fines::{self, FineRates},
};

/// Attempts at generating a non-colliding loan code before giving up
const CODE_ATTEMPTS: u32 = 3;

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    rules: LoanRulesConfig,
}

impl LoansService {
    pub fn new(repository: Repository, rules: LoanRulesConfig) -> Self {
        Self { repository, rules }
    }

    /// Get loan with names for display
    pub async fn get_details(&self, loan_id: i32) -> AppResult<LoanDetails> {
        self.repository.loans.get_details(loan_id).await
    }

    /// List all loans (staff view)
    pub async fn list(&self) -> AppResult<Vec<LoanDetails>> {
        self.repository.loans.list().await
    }

    /// List one borrower's loans
    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<LoanDetails>> {
        self.repository.loans.list_for_user(user_id).await
    }

    /// Active loans past due, annotated with their overdue day count
    pub async fn list_overdue(&self) -> AppResult<Vec<OverdueLoan>> {
        let now = Utc::now();
        let rows = self.repository.loans.list_overdue(now).await?;
        Ok(rows
            .into_iter()
            .map(|loan| {
                let days_overdue = loan
                    .due_at
                    .map(|due| fines::late_days(due, now))
                    .unwrap_or(0);
                OverdueLoan { loan, days_overdue }
            })
            .collect())
    }

    /// Borrower submits a loan request. The loan starts PENDING and takes no
    /// stock; stock is reserved at approval time only.
    pub async fn submit(
        &self,
        borrower_id: i32,
        request: &SubmitLoan,
    ) -> AppResult<Loan> {
        let borrower = self.repository.users.get_by_id(borrower_id).await?;
        if borrower.status != AccountStatus::Active {
            return Err(AppError::Validation(
                "Your account is inactive or blocked".to_string(),
            ));
        }

        let open = self.repository.loans.count_open_for_user(borrower_id).await?;
        if open >= self.rules.max_simultaneous_loans {
            return Err(AppError::Validation(format!(
                "You already have {} open loans; the maximum is {}",
                open, self.rules.max_simultaneous_loans
            )));
        }

        let equipment = self
            .repository
            .equipment
            .get_by_id(request.equipment_id)
            .await?;
        if equipment.stock <= 0 {
            return Err(AppError::Validation(
                "Equipment stock is not available".to_string(),
            ));
        }
        if !equipment.condition.is_borrowable() {
            return Err(AppError::Validation(format!(
                "Equipment cannot be borrowed in condition {}",
                equipment.condition
            )));
        }

        let duplicate = self
            .repository
            .loans
            .has_open_for_equipment(borrower_id, request.equipment_id)
            .await?;
        if duplicate {
            return Err(AppError::Validation(
                "You already have an open loan for this equipment".to_string(),
            ));
        }

        // Retry on the (unlikely) code collision rather than hoping the
        // first draw is unique.
        let mut last_err = None;
        for _ in 0..CODE_ATTEMPTS {
            let code = generate_loan_code();
            match self
                .repository
                .loans
                .create(
                    &code,
                    borrower_id,
                    request.equipment_id,
                    &request.reason,
                    request.purpose.as_deref(),
                )
                .await
            {
                Ok(loan) => {
                    self.audit(
                        borrower_id,
                        ActivityType::SubmitLoan,
                        &format!("Submitted loan {} for equipment {}", loan.code, equipment.name),
                    )
                    .await;
                    return Ok(loan);
                }
                Err(e @ AppError::Conflict(_)) => last_err = Some(e),
                Err(e) => return Err(e),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            AppError::Internal("Loan code generation failed".to_string())
        }))
    }

    /// Staff approves or rejects a pending loan
    pub async fn verify(
        &self,
        loan_id: i32,
        actor_id: i32,
        request: &VerifyLoan,
    ) -> AppResult<Loan> {
        let loan = self.repository.loans.get_by_id(loan_id).await?;
        if loan.status != LoanStatus::Pending {
            return Err(AppError::Validation(format!(
                "Loan {} cannot be verified in status {}",
                loan.code, loan.status
            )));
        }

        let borrower = self.repository.users.get_by_id(loan.user_id).await?;
        if borrower.status != AccountStatus::Active {
            return Err(AppError::Validation(
                "Borrower account is inactive or blocked".to_string(),
            ));
        }

        match request.action {
            VerifyAction::Approve => {
                let now = Utc::now();
                let duration = request
                    .duration_days
                    .unwrap_or(self.rules.default_loan_duration_days);
                let due_at = now + Duration::days(duration);

                let updated = self
                    .repository
                    .loans
                    .approve(loan_id, now, due_at, request.notes.as_deref())
                    .await?;

                self.audit(
                    actor_id,
                    ActivityType::ApproveLoan,
                    &format!(
                        "Approved loan {} for {} until {}",
                        updated.code,
                        borrower.full_name,
                        due_at.format("%Y-%m-%d")
                    ),
                )
                .await;
                Ok(updated)
            }
            VerifyAction::Reject => {
                let reason = request
                    .reject_reason
                    .as_deref()
                    .filter(|r| !r.trim().is_empty())
                    .ok_or_else(|| {
                        AppError::Validation("A rejection reason is required".to_string())
                    })?;

                let updated = self
                    .repository
                    .loans
                    .reject(loan_id, reason, request.notes.as_deref())
                    .await?;

                self.audit(
                    actor_id,
                    ActivityType::RejectLoan,
                    &format!("Rejected loan {}: {}", updated.code, reason),
                )
                .await;
                Ok(updated)
            }
        }
    }

    /// Borrower cancels their own pending request. Staff may cancel any
    /// pending request on a borrower's behalf.
    pub async fn cancel(&self, loan_id: i32, actor_id: i32, actor_role: Role) -> AppResult<Loan> {
        let loan = self.repository.loans.get_by_id(loan_id).await?;

        if actor_role == Role::Borrower && loan.user_id != actor_id {
            return Err(AppError::Forbidden(
                "You can only cancel your own loan requests".to_string(),
            ));
        }
        if loan.status != LoanStatus::Pending {
            return Err(AppError::Validation(
                "Only pending loan requests can be cancelled".to_string(),
            ));
        }

        let updated = self
            .repository
            .loans
            .reject(loan_id, "Cancelled by borrower", None)
            .await?;

        self.audit(
            actor_id,
            ActivityType::CancelLoan,
            &format!("Cancelled loan {}", updated.code),
        )
        .await;
        Ok(updated)
    }

    /// Staff processes a return on an active loan: computes the fine, then
    /// closes the loan, stores the return record and restores stock in one
    /// transaction.
    pub async fn process_return(
        &self,
        actor_id: i32,
        request: &ProcessReturn,
    ) -> AppResult<ReturnRecord> {
        let loan = self.repository.loans.get_by_id(request.loan_id).await?;
        if loan.status != LoanStatus::Active {
            return Err(AppError::Validation(format!(
                "Loan {} cannot be returned in status {}",
                loan.code, loan.status
            )));
        }
        if self.repository.returns.exists_for_loan(loan.id).await? {
            return Err(AppError::Validation(format!(
                "Loan {} has already been returned",
                loan.code
            )));
        }
        let due_at = loan.due_at.ok_or_else(|| {
            AppError::Internal(format!("Active loan {} has no due date", loan.code))
        })?;

        let equipment = self
            .repository
            .equipment
            .get_by_id(loan.equipment_id)
            .await?;

        let now = Utc::now();
        let fine = fines::compute_fine(
            due_at,
            now,
            request.condition,
            equipment.price,
            request.manual_damage_fine,
            FineRates::from(&self.rules),
        );
        let fine_status = if fine.total > 0 {
            FineStatus::Unpaid
        } else {
            FineStatus::Paid
        };

        let record = self
            .repository
            .loans
            .finish_return(
                loan.id,
                loan.equipment_id,
                actor_id,
                now,
                request.condition,
                fine.late_fine,
                fine.condition_fine,
                fine_status,
                request.notes.as_deref(),
            )
            .await?;

        self.audit(
            actor_id,
            ActivityType::ProcessReturn,
            &format!(
                "Processed return of loan {} in condition {} (fine {} = late {} + condition {})",
                loan.code, request.condition, fine.total, fine.late_fine, fine.condition_fine
            ),
        )
        .await;
        Ok(record)
    }

    /// Audit failures must not fail the operation that triggered them
    async fn audit(&self, user_id: i32, event: ActivityType, detail: &str) {
        if let Err(e) = self.repository.activity.log(user_id, event.as_str(), detail).await {
            tracing::warn!("Failed to write activity log: {}", e);
        }
    }
}

/// Generate a loan code of the form PJM-YYYYMMDD-XXXXX
fn generate_loan_code() -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..5)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("PJM-{}-{}", Utc::now().format("%Y%m%d"), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loan_codes_follow_the_expected_shape() {
        let code = generate_loan_code();
        let parts: Vec<&str> = code.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "PJM");
        assert_eq!(parts[1].len(), 8);
        assert_eq!(parts[2].len(), 5);
        assert!(parts[2].chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
