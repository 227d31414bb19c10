//! Return records and fine settlement
//!
//! The return itself is created by the loan service inside the close
//! transaction; this service covers the read side and the later settlement
//! of the fine (paid, installment, or an admin waiver).

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{ActivityType, FineStatus, Role},
        return_record::{ReturnRecord, UpdateFineStatus},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct ReturnsService {
    repository: Repository,
}

impl ReturnsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn get(&self, id: i32) -> AppResult<ReturnRecord> {
        self.repository.returns.get_by_id(id).await
    }

    pub async fn list(&self) -> AppResult<Vec<ReturnRecord>> {
        self.repository.returns.list().await
    }

    /// Settle or re-stage the fine on a return. Waiving is an admin-only
    /// act and must carry a reason, which lands in the record's notes.
    pub async fn set_fine_status(
        &self,
        actor_id: i32,
        actor_role: Role,
        return_id: i32,
        request: &UpdateFineStatus,
    ) -> AppResult<ReturnRecord> {
        let record = self.repository.returns.get_by_id(return_id).await?;

        if record.fine_amount == 0 {
            return Err(AppError::Validation(
                "This return carries no fine to settle".to_string(),
            ));
        }
        if record.fine_status == FineStatus::Paid {
            return Err(AppError::Validation(
                "The fine has already been settled".to_string(),
            ));
        }
        if record.fine_status == request.fine_status {
            return Err(AppError::Validation(format!(
                "The fine is already {}",
                record.fine_status
            )));
        }

        let appended_note = match request.fine_status {
            FineStatus::Waived => {
                if actor_role != Role::Admin {
                    return Err(AppError::Forbidden(
                        "Only administrators can waive fines".to_string(),
                    ));
                }
                let reason = request
                    .waive_reason
                    .as_deref()
                    .filter(|r| !r.trim().is_empty())
                    .ok_or_else(|| {
                        AppError::Validation("A waive reason is required".to_string())
                    })?;
                Some(format!("Fine waived: {}", reason))
            }
            FineStatus::Unpaid => {
                return Err(AppError::Validation(
                    "A fine cannot be moved back to unpaid".to_string(),
                ));
            }
            _ => None,
        };

        let updated = self
            .repository
            .returns
            .set_fine_status(return_id, request.fine_status, appended_note.as_deref())
            .await?;

        if let Err(e) = self
            .repository
            .activity
            .log(
                actor_id,
                ActivityType::UpdateFineStatus.as_str(),
                &format!(
                    "Fine on return {} moved from {} to {}",
                    return_id, record.fine_status, updated.fine_status
                ),
            )
            .await
        {
            tracing::warn!("Failed to write activity log: {}", e);
        }
        Ok(updated)
    }
}
