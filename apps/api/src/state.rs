use engeserv_application::{AuthorizationGate, InvitationService, SessionService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub session_service: SessionService,
    pub invitation_service: InvitationService,
    /// Gate over the HTTP routes, applied by middleware.
    pub api_gate: AuthorizationGate,
    /// Gate over the dashboard pages, queried by the navigation endpoints.
    pub dashboard_gate: AuthorizationGate,
    /// Serialized dashboard origin accepted on mutating requests.
    pub allowed_origin: String,
}
