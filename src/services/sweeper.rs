//! Overdue/blacklist sweeper
//!
//! Periodic batch that blocks borrowers holding severely overdue loans.
//! Run-to-completion: one borrower's failure is logged and skipped, the rest
//! of the batch still runs. Loans themselves stay ACTIVE until returned.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    config::LoanRulesConfig,
    error::AppResult,
    models::loan::SeverelyOverdueLoan,
    repository::Repository,
    services::fines,
};

/// Outcome of one sweep run
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SweepReport {
    pub blocked_count: usize,
    pub blocked_user_ids: Vec<i32>,
}

#[derive(Serialize)]
struct AuditLoan<'a> {
    code: &'a str,
    equipment: &'a str,
    due_at: Option<DateTime<Utc>>,
    days_overdue: i64,
}

#[derive(Clone)]
pub struct SweeperService {
    repository: Repository,
    rules: LoanRulesConfig,
}

impl SweeperService {
    pub fn new(repository: Repository, rules: LoanRulesConfig) -> Self {
        Self { repository, rules }
    }

    /// Scan for severely overdue active loans and block their borrowers.
    /// Idempotent: already-blocked borrowers are filtered out in the query
    /// and again by the guarded UPDATE, so a second run is a no-op.
    pub async fn run_overdue_sweep(&self, now: DateTime<Utc>) -> AppResult<SweepReport> {
        let cutoff = now - Duration::days(self.rules.blacklist_overdue_days);
        let overdue = self.repository.loans.list_severely_overdue(cutoff).await?;

        if overdue.is_empty() {
            tracing::info!("Overdue sweep: nothing to do");
            return Ok(SweepReport { blocked_count: 0, blocked_user_ids: Vec::new() });
        }

        let mut by_borrower: BTreeMap<i32, Vec<SeverelyOverdueLoan>> = BTreeMap::new();
        for loan in overdue {
            by_borrower.entry(loan.user_id).or_default().push(loan);
        }

        let mut blocked_user_ids = Vec::new();
        for (user_id, loans) in by_borrower {
            match self.block_one(user_id, &loans, now).await {
                Ok(true) => {
                    tracing::warn!(
                        "Auto-blocked borrower {} ({} severely overdue loans)",
                        loans[0].username,
                        loans.len()
                    );
                    blocked_user_ids.push(user_id);
                }
                Ok(false) => {} // lost a race with another blocker; fine
                Err(e) => {
                    // Isolate this borrower's failure from the rest of the batch
                    tracing::error!("Overdue sweep failed for user {}: {}", user_id, e);
                }
            }
        }

        Ok(SweepReport { blocked_count: blocked_user_ids.len(), blocked_user_ids })
    }

    async fn block_one(
        &self,
        user_id: i32,
        loans: &[SeverelyOverdueLoan],
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let affected: Vec<AuditLoan<'_>> = loans
            .iter()
            .map(|l| AuditLoan {
                code: &l.code,
                equipment: &l.equipment_name,
                due_at: l.due_at,
                days_overdue: l.due_at.map(|due| fines::late_days(due, now)).unwrap_or(0),
            })
            .collect();

        let detail = serde_json::json!({
            "reason": format!(
                "Automatic block: loans overdue by more than {} days",
                self.rules.blacklist_overdue_days
            ),
            "affected_loans": affected,
        })
        .to_string();

        self.repository.loans.block_borrower(user_id, &detail).await
    }
}
