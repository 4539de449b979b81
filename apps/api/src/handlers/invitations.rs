use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use engeserv_application::CreateInvitationInput;
use engeserv_domain::{Actor, InvitationId};
use uuid::Uuid;

use crate::dto::{CreateInvitationRequest, InvitationResponse, ResendInvitationRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_invitations_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<Vec<InvitationResponse>>> {
    let invitations = state.invitation_service.list(&actor).await?;

    Ok(Json(
        invitations.iter().map(InvitationResponse::from).collect(),
    ))
}

pub async fn create_invitation_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<CreateInvitationRequest>,
) -> ApiResult<(StatusCode, Json<InvitationResponse>)> {
    let input = CreateInvitationInput::try_from(payload)?;
    let invitation = state.invitation_service.create(&actor, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(InvitationResponse::from(&invitation)),
    ))
}

pub async fn resend_invitation_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(invitation_id): Path<Uuid>,
    Json(payload): Json<ResendInvitationRequest>,
) -> ApiResult<Json<InvitationResponse>> {
    let invitation = state
        .invitation_service
        .resend(
            &actor,
            InvitationId::from_uuid(invitation_id),
            payload.ttl_days,
        )
        .await?;

    Ok(Json(InvitationResponse::from(&invitation)))
}

pub async fn revoke_invitation_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(invitation_id): Path<Uuid>,
) -> ApiResult<Json<InvitationResponse>> {
    let invitation = state
        .invitation_service
        .revoke(&actor, InvitationId::from_uuid(invitation_id))
        .await?;

    Ok(Json(InvitationResponse::from(&invitation)))
}
