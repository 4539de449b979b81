use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::Response;
use engeserv_application::GateDecision;
use engeserv_core::AppError;
use engeserv_domain::Actor;
use tower_sessions::Session;

use crate::error::ApiResult;
use crate::session_store::TowerSessionStore;
use crate::state::AppState;

/// Runs the API gate for the matched route. Protected routes receive the
/// session [`Actor`] as a request extension.
pub async fn authorize_route(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let store = TowerSessionStore::new(session);
    let decision = state
        .api_gate
        .evaluate(&store, request.uri().path())
        .await?;

    if let Some(actor) = admit(decision)? {
        request.extensions_mut().insert(actor);
    }

    Ok(next.run(request).await)
}

/// Maps a gate decision onto the HTTP surface: a missing session is 401,
/// a missing permission is 403.
fn admit(decision: GateDecision) -> Result<Option<Actor>, AppError> {
    match decision {
        GateDecision::Allow(actor) => Ok(actor),
        GateDecision::Deny { required } => Err(AppError::Forbidden(format!(
            "permission '{required}' is required"
        ))),
        GateDecision::RedirectToLogin => {
            Err(AppError::Unauthorized("authentication required".to_owned()))
        }
    }
}

pub async fn require_same_origin_for_mutations(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    check_same_origin(request.method(), request.headers(), &state.allowed_origin)?;
    Ok(next.run(request).await)
}

fn check_same_origin(
    method: &Method,
    headers: &HeaderMap,
    allowed_origin: &str,
) -> Result<(), AppError> {
    if !is_state_changing_method(method) {
        return Ok(());
    }

    if headers.get("sec-fetch-site") == Some(&HeaderValue::from_static("cross-site")) {
        return Err(AppError::Unauthorized("cross-site request blocked".to_owned()));
    }

    let origin = headers
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let referer = headers
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let origin_is_allowed = origin == allowed_origin;
    let referer_is_allowed = referer == allowed_origin
        || referer
            .strip_prefix(allowed_origin)
            .is_some_and(|rest| rest.starts_with('/'));

    if !origin_is_allowed && !referer_is_allowed {
        return Err(AppError::Unauthorized("origin validation failed".to_owned()));
    }

    Ok(())
}

fn is_state_changing_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}
