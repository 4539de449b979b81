use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use engeserv_core::AppError;
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::state::AppState;
use crate::{handlers, middleware};

mod cors;

/// Builds the HTTP surface. Every route passes the API gate, which admits
/// public routes and checks the route catalog requirement for the rest.
pub fn build_router<Store>(
    app_state: AppState,
    allowed_origin: &str,
    session_layer: SessionManagerLayer<Store>,
) -> Result<Router, AppError>
where
    Store: SessionStore + Clone,
{
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/login", post(handlers::auth::login_handler))
        .route("/auth/logout", post(handlers::auth::logout_handler))
        .route(
            "/auth/invitations/accept",
            post(handlers::auth::accept_invitation_handler),
        );

    let protected_routes = Router::new()
        .route("/auth/me", get(handlers::auth::me_handler))
        .route("/api/navigation", get(handlers::access::navigation_handler))
        .route(
            "/api/navigation/access",
            get(handlers::access::navigation_access_handler),
        )
        .route(
            "/api/permissions/check",
            post(handlers::access::check_permission_handler),
        )
        .route(
            "/api/branches/{branch_id}/access",
            get(handlers::access::branch_access_handler),
        )
        .route(
            "/api/invitations",
            get(handlers::invitations::list_invitations_handler)
                .post(handlers::invitations::create_invitation_handler),
        )
        .route(
            "/api/invitations/{invitation_id}/resend",
            post(handlers::invitations::resend_invitation_handler),
        )
        .route(
            "/api/invitations/{invitation_id}/revoke",
            post(handlers::invitations::revoke_invitation_handler),
        );

    Ok(Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::authorize_route,
        ))
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(allowed_origin)?)
        .layer(session_layer)
        .with_state(app_state))
}
