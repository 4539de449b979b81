use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use engeserv_domain::Actor;
use tower_sessions::Session;
use tracing::info;

use crate::dto::{AcceptInvitationRequest, AcceptedInvitationResponse, LoginRequest, SessionResponse};
use crate::error::ApiResult;
use crate::session_store::TowerSessionStore;
use crate::state::AppState;

/// POST /auth/login - Authenticate with email+password.
pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let store = TowerSessionStore::new(session);
    let actor = state
        .session_service
        .login(&store, &payload.email, &payload.password)
        .await?;

    Ok(Json(session_response(&state, &actor)))
}

/// POST /auth/logout - Clear the session. Succeeds without a session too.
pub async fn logout_handler(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<StatusCode> {
    state
        .session_service
        .logout(&TowerSessionStore::new(session))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn me_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Json<SessionResponse> {
    Json(session_response(&state, &actor))
}

/// POST /auth/invitations/accept - Redeem an invitation token.
pub async fn accept_invitation_handler(
    State(state): State<AppState>,
    Json(payload): Json<AcceptInvitationRequest>,
) -> ApiResult<(StatusCode, Json<AcceptedInvitationResponse>)> {
    let user = state.invitation_service.accept(payload.into()).await?;
    info!(subject = %user.id, tenant_id = %user.tenant_id, "account created from invitation");

    Ok((StatusCode::CREATED, Json(AcceptedInvitationResponse::from(user))))
}

fn session_response(state: &AppState, actor: &Actor) -> SessionResponse {
    let permissions = state.api_gate.resolver().effective_permissions(actor);
    SessionResponse::new(actor, &permissions)
}
