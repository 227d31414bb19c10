//! Shared domain enums

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Account roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Staff,
    Borrower,
}

impl Role {
    /// Admin and staff share the verification/return duties
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Staff)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Role::Admin => "Administrator",
            Role::Staff => "Staff",
            Role::Borrower => "Borrower",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// AccountStatus
// ---------------------------------------------------------------------------

/// Account status; blocked accounts cannot borrow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "account_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    Active,
    Blocked,
    Inactive,
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            AccountStatus::Active => "Active",
            AccountStatus::Blocked => "Blocked",
            AccountStatus::Inactive => "Inactive",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// EquipmentCondition
// ---------------------------------------------------------------------------

/// Physical condition of an equipment item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "equipment_condition", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EquipmentCondition {
    Good,
    MinorDamage,
    MajorDamage,
    Lost,
    InRepair,
}

impl EquipmentCondition {
    /// Total severity order used when merging a return condition back onto
    /// the equipment record. Equipment condition never improves through a
    /// return; a strictly higher severity overwrites.
    pub fn severity(&self) -> u8 {
        match self {
            EquipmentCondition::Good => 0,
            EquipmentCondition::MinorDamage => 1,
            EquipmentCondition::MajorDamage | EquipmentCondition::InRepair => 2,
            EquipmentCondition::Lost => 3,
        }
    }

    /// Only items in good or lightly damaged condition can go out
    pub fn is_borrowable(&self) -> bool {
        matches!(self, EquipmentCondition::Good | EquipmentCondition::MinorDamage)
    }
}

impl std::fmt::Display for EquipmentCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            EquipmentCondition::Good => "Good",
            EquipmentCondition::MinorDamage => "Minor damage",
            EquipmentCondition::MajorDamage => "Major damage",
            EquipmentCondition::Lost => "Lost",
            EquipmentCondition::InRepair => "In repair",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// LoanStatus
// ---------------------------------------------------------------------------

/// Loan lifecycle: PENDING -> ACTIVE | REJECTED; ACTIVE -> RETURNED.
/// REJECTED and RETURNED are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "loan_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanStatus {
    Pending,
    Active,
    Rejected,
    Returned,
}

impl LoanStatus {
    /// Statuses that count against the borrower's simultaneous-loan cap and
    /// against the one-loan-per-item rule
    pub fn is_open(&self) -> bool {
        matches!(self, LoanStatus::Pending | LoanStatus::Active)
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            LoanStatus::Pending => "Awaiting approval",
            LoanStatus::Active => "On loan",
            LoanStatus::Rejected => "Rejected",
            LoanStatus::Returned => "Returned",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// ExtensionStatus
// ---------------------------------------------------------------------------

/// Extension sub-state: PENDING -> APPROVED | REJECTED, both terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "extension_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExtensionStatus {
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for ExtensionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ExtensionStatus::Pending => "Pending",
            ExtensionStatus::Approved => "Approved",
            ExtensionStatus::Rejected => "Rejected",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// FineStatus
// ---------------------------------------------------------------------------

/// Settlement state of the fine attached to a return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "fine_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FineStatus {
    Unpaid,
    Paid,
    Installment,
    Waived,
}

impl std::fmt::Display for FineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            FineStatus::Unpaid => "Unpaid",
            FineStatus::Paid => "Paid",
            FineStatus::Installment => "Installment",
            FineStatus::Waived => "Waived",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// VerifyAction
// ---------------------------------------------------------------------------

/// Staff decision on a pending loan or extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerifyAction {
    Approve,
    Reject,
}

// ---------------------------------------------------------------------------
// ActivityType
// ---------------------------------------------------------------------------

/// Event types written to the activity log (stored as text)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityType {
    Login,
    CreateUser,
    UpdateUserStatus,
    DeleteUser,
    RestoreUser,
    CreateCategory,
    DeleteCategory,
    RestoreCategory,
    CreateEquipment,
    UpdateEquipment,
    DeleteEquipment,
    RestoreEquipment,
    SubmitLoan,
    ApproveLoan,
    RejectLoan,
    CancelLoan,
    RequestExtension,
    ApproveExtension,
    RejectExtension,
    ProcessReturn,
    UpdateFineStatus,
    AutoBlock,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Login => "LOGIN",
            ActivityType::CreateUser => "CREATE_USER",
            ActivityType::UpdateUserStatus => "UPDATE_USER_STATUS",
            ActivityType::DeleteUser => "DELETE_USER",
            ActivityType::RestoreUser => "RESTORE_USER",
            ActivityType::CreateCategory => "CREATE_CATEGORY",
            ActivityType::DeleteCategory => "DELETE_CATEGORY",
            ActivityType::RestoreCategory => "RESTORE_CATEGORY",
            ActivityType::CreateEquipment => "CREATE_EQUIPMENT",
            ActivityType::UpdateEquipment => "UPDATE_EQUIPMENT",
            ActivityType::DeleteEquipment => "DELETE_EQUIPMENT",
            ActivityType::RestoreEquipment => "RESTORE_EQUIPMENT",
            ActivityType::SubmitLoan => "SUBMIT_LOAN",
            ActivityType::ApproveLoan => "APPROVE_LOAN",
            ActivityType::RejectLoan => "REJECT_LOAN",
            ActivityType::CancelLoan => "CANCEL_LOAN",
            ActivityType::RequestExtension => "REQUEST_EXTENSION",
            ActivityType::ApproveExtension => "APPROVE_EXTENSION",
            ActivityType::RejectExtension => "REJECT_EXTENSION",
            ActivityType::ProcessReturn => "PROCESS_RETURN",
            ActivityType::UpdateFineStatus => "UPDATE_FINE_STATUS",
            ActivityType::AutoBlock => "AUTO_BLOCK",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_is_a_total_order_with_lost_on_top() {
        use EquipmentCondition::*;
        assert!(Good.severity() < MinorDamage.severity());
        assert!(MinorDamage.severity() < MajorDamage.severity());
        assert_eq!(MajorDamage.severity(), InRepair.severity());
        assert!(MajorDamage.severity() < Lost.severity());
    }

    #[test]
    fn only_good_and_minor_damage_are_borrowable() {
        use EquipmentCondition::*;
        assert!(Good.is_borrowable());
        assert!(MinorDamage.is_borrowable());
        assert!(!MajorDamage.is_borrowable());
        assert!(!Lost.is_borrowable());
        assert!(!InRepair.is_borrowable());
    }
}
