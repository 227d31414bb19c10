//! Fine calculation
//!
//! Pure arithmetic over dates and rates, no I/O, so the business rules can
//! be pinned in tests without a database.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{config::LoanRulesConfig, models::enums::EquipmentCondition};

/// Fine rates in whole rupiah
#[derive(Debug, Clone, Copy)]
pub struct FineRates {
    pub per_day: i64,
    pub minor_damage: i64,
    pub major_damage: i64,
}

impl From<&LoanRulesConfig> for FineRates {
    fn from(rules: &LoanRulesConfig) -> Self {
        Self {
            per_day: rules.fine_per_day,
            minor_damage: rules.fine_minor_damage,
            major_damage: rules.fine_major_damage,
        }
    }
}

/// Itemized fine for a single return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct FineBreakdown {
    pub total: i64,
    pub late_fine: i64,
    pub condition_fine: i64,
}

/// Days late, rounded up; an early or on-time return counts as zero
pub fn late_days(due_at: DateTime<Utc>, returned_at: DateTime<Utc>) -> i64 {
    let secs = (returned_at - due_at).num_seconds();
    if secs <= 0 {
        0
    } else {
        (secs + 86_399) / 86_400
    }
}

/// Compute the fine for a return.
///
/// The late part is `late_days * per_day`. The condition part is zero for a
/// good return; for damage it is the staff-assessed manual amount when one
/// is supplied, otherwise the flat configured rate; a lost item is charged
/// its full replacement price regardless of any manual override.
pub fn compute_fine(
    due_at: DateTime<Utc>,
    returned_at: DateTime<Utc>,
    condition: EquipmentCondition,
    item_price: i64,
    manual_damage_fine: Option<i64>,
    rates: FineRates,
) -> FineBreakdown {
    let late_fine = late_days(due_at, returned_at) * rates.per_day;

    let condition_fine = match condition {
        EquipmentCondition::Good => 0,
        EquipmentCondition::MinorDamage => manual_damage_fine.unwrap_or(rates.minor_damage),
        EquipmentCondition::MajorDamage | EquipmentCondition::InRepair => {
            manual_damage_fine.unwrap_or(rates.major_damage)
        }
        EquipmentCondition::Lost => item_price,
    };

    FineBreakdown {
        total: late_fine + condition_fine,
        late_fine,
        condition_fine,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    const RATES: FineRates = FineRates {
        per_day: 5_000,
        minor_damage: 20_000,
        major_damage: 50_000,
    };

    fn due() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn on_time_good_return_is_free() {
        let fine = compute_fine(due(), due(), EquipmentCondition::Good, 800_000, None, RATES);
        assert_eq!(
            fine,
            FineBreakdown { total: 0, late_fine: 0, condition_fine: 0 }
        );
    }

    #[test]
    fn three_days_late_charges_three_daily_rates() {
        let fine = compute_fine(
            due(),
            due() + Duration::days(3),
            EquipmentCondition::Good,
            800_000,
            None,
            RATES,
        );
        assert_eq!(fine.late_fine, 15_000);
        assert_eq!(fine.condition_fine, 0);
        assert_eq!(fine.total, 15_000);
    }

    #[test]
    fn partial_days_round_up() {
        let fine = compute_fine(
            due(),
            due() + Duration::hours(25),
            EquipmentCondition::Good,
            0,
            None,
            RATES,
        );
        assert_eq!(fine.late_fine, 2 * RATES.per_day);
    }

    #[test]
    fn early_return_never_earns_credit() {
        let fine = compute_fine(
            due(),
            due() - Duration::days(2),
            EquipmentCondition::Good,
            0,
            None,
            RATES,
        );
        assert_eq!(fine.total, 0);
    }

    #[test]
    fn lost_item_costs_its_full_price() {
        let fine = compute_fine(due(), due(), EquipmentCondition::Lost, 800_000, None, RATES);
        assert_eq!(fine.condition_fine, 800_000);
        assert_eq!(fine.total, 800_000);
    }

    #[test]
    fn lost_item_ignores_manual_damage_override() {
        let fine = compute_fine(
            due(),
            due(),
            EquipmentCondition::Lost,
            800_000,
            Some(10_000),
            RATES,
        );
        assert_eq!(fine.condition_fine, 800_000);
    }

    #[test]
    fn damage_uses_flat_rate_or_manual_override() {
        let flat = compute_fine(due(), due(), EquipmentCondition::MinorDamage, 0, None, RATES);
        assert_eq!(flat.condition_fine, 20_000);

        let manual = compute_fine(
            due(),
            due(),
            EquipmentCondition::MajorDamage,
            0,
            Some(35_000),
            RATES,
        );
        assert_eq!(manual.condition_fine, 35_000);
    }

    #[test]
    fn late_and_damaged_fines_add_up() {
        let fine = compute_fine(
            due(),
            due() + Duration::days(3),
            EquipmentCondition::MinorDamage,
            800_000,
            None,
            RATES,
        );
        assert_eq!(fine.total, 35_000);
        assert_eq!(fine.late_fine, 15_000);
        assert_eq!(fine.condition_fine, 20_000);
    }
}
