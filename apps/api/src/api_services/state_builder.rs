use std::sync::Arc;

use engeserv_application::{
    AuthorizationGate, BootstrapService, InvitationService, InvitationSettings, PasswordHasher,
    PermissionResolver, SessionService, UserRepository,
};
use engeserv_core::AppError;
use engeserv_domain::NavigationCatalog;
use engeserv_infrastructure::{
    Argon2PasswordHasher, PostgresCompanyRepository, PostgresInvitationRepository,
    PostgresUserRepository,
};
use sqlx::PgPool;

use crate::api_config::ApiConfig;
use crate::route_catalog::api_catalog;
use crate::state::AppState;

use super::email::build_email_service;

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> Result<AppState, AppError> {
    let resolver = PermissionResolver::new(Arc::new(config.role_table.clone()));
    let user_repository: Arc<dyn UserRepository> =
        Arc::new(PostgresUserRepository::new(pool.clone()));
    let password_hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher::new());

    let invitation_service = InvitationService::new(
        Arc::new(PostgresInvitationRepository::new(pool)),
        user_repository.clone(),
        password_hasher.clone(),
        build_email_service(config)?,
        resolver.clone(),
        InvitationSettings {
            frontend_url: config.frontend_url.clone(),
            default_ttl_days: config.invitation_ttl_days,
        },
    );

    Ok(AppState {
        session_service: SessionService::new(user_repository, password_hasher),
        invitation_service,
        api_gate: AuthorizationGate::new(resolver.clone(), api_catalog()?),
        dashboard_gate: AuthorizationGate::new(resolver, NavigationCatalog::dashboard()),
        allowed_origin: config.allowed_origin.clone(),
    })
}

pub fn build_bootstrap_service(pool: PgPool) -> BootstrapService {
    BootstrapService::new(
        Arc::new(PostgresCompanyRepository::new(pool.clone())),
        Arc::new(PostgresUserRepository::new(pool)),
        Arc::new(Argon2PasswordHasher::new()),
    )
}
