//! Sarpras Server - School Equipment Loan Management System
//!
//! REST API server for managing school equipment loans.

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sarpras_server::{api, config::AppConfig, repository::Repository, services::Services, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("sarpras_server={},tower_http=debug", config.logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Sarpras Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;
    let sweep_interval = Duration::from_secs(config.loans.sweep_interval_secs);

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(repository, &config);

    // First-run admin bootstrap
    services
        .users
        .bootstrap_admin()
        .await
        .expect("Failed to bootstrap admin account");

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Spawn the periodic overdue/blacklist sweeper
    let sweeper = state.services.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            match sweeper.sweeper.run_overdue_sweep(Utc::now()).await {
                Ok(report) if report.blocked_count > 0 => {
                    tracing::warn!(
                        "Overdue sweep blocked {} borrowers: {:?}",
                        report.blocked_count,
                        report.blocked_user_ids
                    );
                }
                Ok(_) => {}
                Err(e) => tracing::error!("Overdue sweep failed: {}", e),
            }
        }
    });

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(server_host.parse().expect("Invalid host address"), server_port);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        // Authentication
        .route("/auth/login", post(api::auth::login))
        .route("/auth/me", get(api::auth::me))
        // Users
        .route("/users", get(api::users::list_users))
        .route("/users", post(api::users::create_user))
        .route("/users/recycle-bin", get(api::users::list_deleted_users))
        .route("/users/:id", get(api::users::get_user))
        .route("/users/:id", delete(api::users::delete_user))
        .route("/users/:id/status", patch(api::users::update_user_status))
        .route("/users/:id/restore", post(api::users::restore_user))
        .route("/users/:id/purge", delete(api::users::purge_user))
        .route("/activity", get(api::users::list_activity))
        // Categories
        .route("/categories", get(api::categories::list_categories))
        .route("/categories", post(api::categories::create_category))
        .route(
            "/categories/recycle-bin",
            get(api::categories::list_deleted_categories),
        )
        .route("/categories/:id", delete(api::categories::delete_category))
        .route("/categories/:id/restore", post(api::categories::restore_category))
        .route("/categories/:id/purge", delete(api::categories::purge_category))
        // Equipment
        .route("/equipment", get(api::equipment::list_equipment))
        .route("/equipment", post(api::equipment::create_equipment))
        .route(
            "/equipment/recycle-bin",
            get(api::equipment::list_deleted_equipment),
        )
        .route("/equipment/:id", get(api::equipment::get_equipment))
        .route("/equipment/:id", put(api::equipment::update_equipment))
        .route("/equipment/:id", delete(api::equipment::delete_equipment))
        .route("/equipment/:id/restore", post(api::equipment::restore_equipment))
        .route("/equipment/:id/purge", delete(api::equipment::purge_equipment))
        // Loans
        .route("/loans", get(api::loans::list_loans))
        .route("/loans", post(api::loans::submit_loan))
        .route("/loans/me", get(api::loans::list_my_loans))
        .route("/loans/overdue", get(api::loans::list_overdue_loans))
        .route("/loans/sweep-overdue", post(api::loans::sweep_overdue))
        .route("/loans/:id", get(api::loans::get_loan))
        .route("/loans/:id/verify", post(api::loans::verify_loan))
        .route("/loans/:id/cancel", post(api::loans::cancel_loan))
        // Extensions
        .route("/extensions", get(api::extensions::list_extensions))
        .route("/extensions", post(api::extensions::request_extension))
        .route("/extensions/:id", get(api::extensions::get_extension))
        .route("/extensions/:id/verify", post(api::extensions::verify_extension))
        // Returns
        .route("/returns", get(api::returns::list_returns))
        .route("/returns", post(api::returns::process_return))
        .route("/returns/:id", get(api::returns::get_return))
        .route("/returns/:id/fine", patch(api::returns::update_fine_status))
        .with_state(state.clone());

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
