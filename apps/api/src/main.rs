//! Engeserv API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod dto;
mod error;
mod handlers;
mod middleware;
mod route_catalog;
mod session_store;
mod state;

use engeserv_core::AppError;
use tracing::info;

use crate::api_config::{ApiCommand, ApiConfig, init_tracing};
use crate::api_router::build_router;
use crate::api_services::{
    build_app_state, build_bootstrap_service, build_postgres_session_layer, connect_and_migrate,
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;
    let pool = connect_and_migrate(&config.database_url).await?;

    match config.command {
        ApiCommand::Migrate => {
            info!("database migrations applied successfully");
            return Ok(());
        }
        ApiCommand::Bootstrap => {
            let outcome = build_bootstrap_service(pool)
                .ensure_superadmin(ApiConfig::bootstrap_request()?)
                .await?;
            info!(
                tenant_id = %outcome.tenant_id,
                branch_id = %outcome.branch_id,
                subject = %outcome.user_id,
                created = outcome.created,
                "bootstrap finished"
            );
            return Ok(());
        }
        ApiCommand::Serve => {}
    }

    let session_layer = build_postgres_session_layer(pool.clone(), &config).await?;
    let app_state = build_app_state(pool, &config)?;
    let app = build_router(app_state, &config.allowed_origin, session_layer)?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "engeserv-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
