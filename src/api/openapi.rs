//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, categories, equipment, extensions, health, loans, returns, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Sarpras API",
        version = "1.0.0",
        description = "School equipment loan management REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        // Auth
        auth::login,
        auth::me,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user_status,
        users::delete_user,
        users::list_deleted_users,
        users::restore_user,
        users::purge_user,
        users::list_activity,
        // Categories
        categories::list_categories,
        categories::create_category,
        categories::delete_category,
        categories::list_deleted_categories,
        categories::restore_category,
        categories::purge_category,
        // Equipment
        equipment::list_equipment,
        equipment::get_equipment,
        equipment::create_equipment,
        equipment::update_equipment,
        equipment::delete_equipment,
        equipment::list_deleted_equipment,
        equipment::restore_equipment,
        equipment::purge_equipment,
        // Loans
        loans::list_loans,
        loans::list_my_loans,
        loans::list_overdue_loans,
        loans::get_loan,
        loans::submit_loan,
        loans::verify_loan,
        loans::cancel_loan,
        loans::sweep_overdue,
        // Extensions
        extensions::list_extensions,
        extensions::get_extension,
        extensions::request_extension,
        extensions::verify_extension,
        // Returns
        returns::list_returns,
        returns::get_return,
        returns::process_return,
        returns::update_fine_status,
    ),
    components(
        schemas(
            // Enums
            crate::models::enums::Role,
            crate::models::enums::AccountStatus,
            crate::models::enums::EquipmentCondition,
            crate::models::enums::LoanStatus,
            crate::models::enums::ExtensionStatus,
            crate::models::enums::FineStatus,
            crate::models::enums::VerifyAction,
            // Users
            crate::models::user::User,
            crate::models::user::CreateUser,
            crate::models::user::UpdateAccountStatus,
            crate::models::user::LoginRequest,
            crate::models::user::LoginResponse,
            crate::models::activity::ActivityLog,
            // Categories
            crate::models::category::Category,
            crate::models::category::CreateCategory,
            // Equipment
            crate::models::equipment::Equipment,
            crate::models::equipment::CreateEquipment,
            crate::models::equipment::UpdateEquipment,
            // Loans
            crate::models::loan::Loan,
            crate::models::loan::LoanDetails,
            crate::models::loan::OverdueLoan,
            crate::models::loan::SubmitLoan,
            crate::models::loan::VerifyLoan,
            crate::services::sweeper::SweepReport,
            // Extensions
            crate::models::extension::Extension,
            crate::models::extension::RequestExtension,
            crate::models::extension::VerifyExtension,
            // Returns
            crate::models::return_record::ReturnRecord,
            crate::models::return_record::ProcessReturn,
            crate::models::return_record::UpdateFineStatus,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "users", description = "Account management and audit trail"),
        (name = "categories", description = "Equipment categories"),
        (name = "equipment", description = "Equipment inventory and recycle bin"),
        (name = "loans", description = "Loan lifecycle"),
        (name = "extensions", description = "Loan extensions"),
        (name = "returns", description = "Returns and fines")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
