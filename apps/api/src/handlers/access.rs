use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use engeserv_core::BranchId;
use engeserv_domain::{Actor, PermissionCode};
use tower_sessions::Session;
use uuid::Uuid;

use crate::dto::{
    BranchAccessResponse, NavigationAccessQuery, NavigationAccessResponse, NavigationItemResponse,
    PermissionCheckRequest, PermissionCheckResponse,
};
use crate::error::ApiResult;
use crate::session_store::TowerSessionStore;
use crate::state::AppState;

/// GET /api/navigation - Dashboard pages the actor may open.
pub async fn navigation_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Json<Vec<NavigationItemResponse>> {
    Json(
        state
            .dashboard_gate
            .reachable_units(&actor)
            .into_iter()
            .map(NavigationItemResponse::from)
            .collect(),
    )
}

/// GET /api/navigation/access?path= - Gate one dashboard navigation.
pub async fn navigation_access_handler(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<NavigationAccessQuery>,
) -> ApiResult<Json<NavigationAccessResponse>> {
    let decision = state
        .dashboard_gate
        .evaluate(&TowerSessionStore::new(session), &query.path)
        .await?;

    Ok(Json(NavigationAccessResponse::new(query.path, &decision)))
}

pub async fn check_permission_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<PermissionCheckRequest>,
) -> ApiResult<Json<PermissionCheckResponse>> {
    let code = PermissionCode::new(payload.code)?;
    let granted = state.api_gate.resolver().has_permission(Some(&actor), &code);

    Ok(Json(PermissionCheckResponse {
        code: code.as_str().to_owned(),
        granted,
    }))
}

pub async fn branch_access_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(branch_id): Path<Uuid>,
) -> Json<BranchAccessResponse> {
    let branch_id = BranchId::from_uuid(branch_id);

    Json(BranchAccessResponse {
        branch_id: branch_id.to_string(),
        granted: state.api_gate.resolver().is_in_branch(&actor, branch_id),
    })
}
