use engeserv_application::{AcceptInvitationInput, UserRecord};
use engeserv_domain::{Actor, PermissionSet};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for email/password login.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/login-request.ts"
)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The signed-in actor and the permissions resolved for it.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/session-response.ts"
)]
pub struct SessionResponse {
    pub subject: String,
    pub display_name: String,
    pub email: Option<String>,
    pub tenant_id: String,
    pub branch_id: Option<String>,
    pub role: String,
    pub permissions: Vec<String>,
}

impl SessionResponse {
    pub fn new(actor: &Actor, effective_permissions: &PermissionSet) -> Self {
        let identity = actor.identity();

        Self {
            subject: identity.subject().to_owned(),
            display_name: identity.display_name().to_owned(),
            email: identity.email().map(str::to_owned),
            tenant_id: identity.tenant_id().to_string(),
            branch_id: identity.branch_id().map(|branch_id| branch_id.to_string()),
            role: actor.role().as_str().to_owned(),
            permissions: effective_permissions.to_strings(),
        }
    }
}

/// Incoming payload for invitation acceptance.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/accept-invitation-request.ts"
)]
pub struct AcceptInvitationRequest {
    pub token: String,
    pub password: String,
    pub display_name: Option<String>,
}

impl From<AcceptInvitationRequest> for AcceptInvitationInput {
    fn from(value: AcceptInvitationRequest) -> Self {
        Self {
            token: value.token,
            display_name: value.display_name,
            password: value.password,
        }
    }
}

/// Account created by accepting an invitation.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/accepted-invitation-response.ts"
)]
pub struct AcceptedInvitationResponse {
    pub user_id: String,
    pub email: String,
    pub display_name: String,
    pub role: String,
}

impl From<UserRecord> for AcceptedInvitationResponse {
    fn from(value: UserRecord) -> Self {
        Self {
            user_id: value.id.to_string(),
            email: value.email.as_str().to_owned(),
            display_name: value.display_name,
            role: value.role.as_str().to_owned(),
        }
    }
}
