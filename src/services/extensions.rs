//! Loan extension service
//!
//! A dependent sub-state attached to an active loan: one pending request at
//! a time, one approval per loan lifetime, and a narrow submission window
//! just before the due date.

use chrono::{DateTime, Utc};

use crate::{
    config::LoanRulesConfig,
    error::{AppError, AppResult},
    models::{
        enums::{ActivityType, ExtensionStatus, LoanStatus, Role, VerifyAction},
        extension::{Extension, RequestExtension, VerifyExtension},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct ExtensionsService {
    repository: Repository,
    rules: LoanRulesConfig,
}

/// Whole days until due, rounded up; negative once the due date has passed
fn days_until_due(due_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let secs = (due_at - now).num_seconds();
    if secs >= 0 {
        (secs + 86_399) / 86_400
    } else {
        -((-secs + 86_399) / 86_400)
    }
}

/// Extension requests are only accepted in the last `window_days` before the
/// due date, and never after it
fn within_window(due_at: DateTime<Utc>, now: DateTime<Utc>, window_days: i64) -> bool {
    let days = days_until_due(due_at, now);
    (0..=window_days).contains(&days)
}

impl ExtensionsService {
    pub fn new(repository: Repository, rules: LoanRulesConfig) -> Self {
        Self { repository, rules }
    }

    pub async fn get(&self, id: i32) -> AppResult<Extension> {
        self.repository.extensions.get_by_id(id).await
    }

    pub async fn list(&self, status: Option<ExtensionStatus>) -> AppResult<Vec<Extension>> {
        self.repository.extensions.list(status).await
    }

    /// Borrower requests an extension on their active loan
    pub async fn request(
        &self,
        requester_id: i32,
        request: &RequestExtension,
    ) -> AppResult<Extension> {
        if i64::from(request.additional_days) > self.rules.max_extension_days {
            return Err(AppError::Validation(format!(
                "Extensions are limited to {} additional days",
                self.rules.max_extension_days
            )));
        }

        let loan = self.repository.loans.get_by_id(request.loan_id).await?;
        if loan.user_id != requester_id {
            return Err(AppError::Forbidden(
                "You can only extend your own loans".to_string(),
            ));
        }
        if loan.status != LoanStatus::Active {
            return Err(AppError::Validation(
                "Only active loans can be extended".to_string(),
            ));
        }
        let due_at = loan.due_at.ok_or_else(|| {
            AppError::Internal(format!("Active loan {} has no due date", loan.code))
        })?;

        if !within_window(due_at, Utc::now(), self.rules.extension_window_days) {
            return Err(AppError::Validation(format!(
                "Extensions can only be requested within {} days before the due date and not after it",
                self.rules.extension_window_days
            )));
        }

        if self
            .repository
            .extensions
            .exists_with_status(loan.id, ExtensionStatus::Pending)
            .await?
        {
            return Err(AppError::Validation(
                "A pending extension already exists for this loan".to_string(),
            ));
        }
        if self
            .repository
            .extensions
            .exists_with_status(loan.id, ExtensionStatus::Approved)
            .await?
        {
            return Err(AppError::Validation(
                "This loan has already been extended once; one extension per loan".to_string(),
            ));
        }

        let extension = self
            .repository
            .extensions
            .create(loan.id, requester_id, request.additional_days, &request.reason)
            .await?;

        self.audit(
            requester_id,
            ActivityType::RequestExtension,
            &format!(
                "Requested {} extra days on loan {}",
                request.additional_days, loan.code
            ),
        )
        .await;
        Ok(extension)
    }

    /// Staff approves or rejects a pending extension. Approval shifts the
    /// parent loan's due date atomically with the status change.
    pub async fn verify(
        &self,
        extension_id: i32,
        actor_id: i32,
        request: &VerifyExtension,
    ) -> AppResult<Extension> {
        let extension = self.repository.extensions.get_by_id(extension_id).await?;
        if extension.status != ExtensionStatus::Pending {
            return Err(AppError::Validation(format!(
                "Extension cannot be verified in status {}",
                extension.status
            )));
        }

        let loan = self.repository.loans.get_by_id(extension.loan_id).await?;
        if loan.status != LoanStatus::Active {
            return Err(AppError::Validation(
                "The parent loan is no longer active".to_string(),
            ));
        }

        match request.action {
            VerifyAction::Approve => {
                let (updated, new_due_at) = self
                    .repository
                    .extensions
                    .approve(
                        extension_id,
                        extension.loan_id,
                        extension.additional_days,
                        actor_id,
                        Utc::now(),
                    )
                    .await?;

                self.audit(
                    actor_id,
                    ActivityType::ApproveExtension,
                    &format!(
                        "Approved {} extra days on loan {}; new due date {}",
                        extension.additional_days,
                        loan.code,
                        new_due_at.format("%Y-%m-%d")
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
                    .extensions
                    .reject(extension_id, actor_id, reason, Utc::now())
                    .await?;

                self.audit(
                    actor_id,
                    ActivityType::RejectExtension,
                    &format!("Rejected extension on loan {}: {}", loan.code, reason),
                )
                .await;
                Ok(updated)
            }
        }
    }

    /// Role gate shared by the extension read endpoints
    pub fn can_view(&self, extension: &Extension, actor_id: i32, role: Role) -> bool {
        role.is_staff() || extension.requester_id == actor_id
    }

    async fn audit(&self, user_id: i32, event: ActivityType, detail: &str) {
        if let Err(e) = self.repository.activity.log(user_id, event.as_str(), detail).await {
            tracing::warn!("Failed to write activity log: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 10, 9, 0, 0).unwrap()
    }

    #[test]
    fn window_accepts_zero_to_three_days_before_due() {
        for days in 0..=3 {
            let due = now() + Duration::days(days);
            assert!(within_window(due, now(), 3), "day {} should be in window", days);
        }
    }

    #[test]
    fn window_rejects_four_days_out() {
        let due = now() + Duration::days(4);
        assert!(!within_window(due, now(), 3));
    }

    #[test]
    fn window_rejects_past_due() {
        let due = now() - Duration::days(1);
        assert!(!within_window(due, now(), 3));
        let due = now() - Duration::hours(1);
        assert!(!within_window(due, now(), 3));
    }

    #[test]
    fn fractional_days_round_toward_the_next_day() {
        // 2.5 days out counts as 3, still inside the window
        let due = now() + Duration::hours(60);
        assert_eq!(days_until_due(due, now()), 3);
        assert!(within_window(due, now(), 3));

        // 3.5 days out counts as 4, outside
        let due = now() + Duration::hours(84);
        assert_eq!(days_until_due(due, now()), 4);
        assert!(!within_window(due, now(), 3));
    }
}
