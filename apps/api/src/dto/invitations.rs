use std::str::FromStr;

use engeserv_application::CreateInvitationInput;
use engeserv_core::{AppError, BranchId};
use engeserv_domain::{Invitation, Role};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for invitation creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-invitation-request.ts"
)]
pub struct CreateInvitationRequest {
    #[serde(default)]
    pub email: String,
    pub role: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    pub branch_id: Option<String>,
    pub ttl_days: Option<u32>,
}

impl TryFrom<CreateInvitationRequest> for CreateInvitationInput {
    type Error = AppError;

    fn try_from(value: CreateInvitationRequest) -> Result<Self, Self::Error> {
        let role = value
            .role
            .filter(|role| !role.trim().is_empty())
            .map(|role| Role::from_str(role.trim()))
            .transpose()?;
        let branch_id = value
            .branch_id
            .filter(|branch_id| !branch_id.trim().is_empty())
            .map(|branch_id| BranchId::from_str(branch_id.trim()))
            .transpose()?;

        Ok(Self {
            email: value.email,
            role,
            permissions: value.permissions,
            branch_id,
            ttl_days: value.ttl_days,
        })
    }
}

/// Incoming payload for invitation resend.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/resend-invitation-request.ts"
)]
pub struct ResendInvitationRequest {
    pub ttl_days: Option<u32>,
}

/// API representation of an invitation. The token never leaves the server.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/invitation-response.ts"
)]
pub struct InvitationResponse {
    pub id: String,
    pub email: String,
    pub role: String,
    pub permissions: Vec<String>,
    pub branch_id: Option<String>,
    pub status: String,
    pub invited_by: String,
    pub expires_at: String,
    pub created_at: String,
    pub accepted_at: Option<String>,
}

impl From<&Invitation> for InvitationResponse {
    fn from(value: &Invitation) -> Self {
        Self {
            id: value.id().to_string(),
            email: value.email().as_str().to_owned(),
            role: value.role().as_str().to_owned(),
            permissions: value.permissions().to_strings(),
            branch_id: value.branch_id().map(|branch_id| branch_id.to_string()),
            status: value.status().as_str().to_owned(),
            invited_by: value.invited_by().to_owned(),
            expires_at: value.expires_at().to_rfc3339(),
            created_at: value.created_at().to_rfc3339(),
            accepted_at: value.accepted_at().map(|accepted_at| accepted_at.to_rfc3339()),
        }
    }
}
