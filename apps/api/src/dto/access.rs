use engeserv_application::GateDecision;
use engeserv_domain::NavigationUnit;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// One dashboard page the actor may open.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/navigation-item-response.ts"
)]
pub struct NavigationItemResponse {
    pub path: String,
    pub label: String,
    pub required_permission: Option<String>,
}

impl From<&NavigationUnit> for NavigationItemResponse {
    fn from(value: &NavigationUnit) -> Self {
        Self {
            path: value.path().to_owned(),
            label: value.label().to_owned(),
            required_permission: value
                .required_permission()
                .map(|code| code.as_str().to_owned()),
        }
    }
}

/// Query for gating one dashboard path.
#[derive(Debug, Deserialize)]
pub struct NavigationAccessQuery {
    pub path: String,
}

/// Gate decision for a dashboard path.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/navigation-access-response.ts"
)]
pub struct NavigationAccessResponse {
    pub path: String,
    /// `allow`, `deny` or `redirect_to_login`.
    pub decision: String,
    pub required_permission: Option<String>,
}

impl NavigationAccessResponse {
    pub fn new(path: String, decision: &GateDecision) -> Self {
        let (decision, required_permission) = match decision {
            GateDecision::Allow(_) => ("allow", None),
            GateDecision::Deny { required } => ("deny", Some(required.as_str().to_owned())),
            GateDecision::RedirectToLogin => ("redirect_to_login", None),
        };

        Self {
            path,
            decision: decision.to_owned(),
            required_permission,
        }
    }
}

/// Incoming payload for a permission check.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-check-request.ts"
)]
pub struct PermissionCheckRequest {
    pub code: String,
}

/// Permission check result.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-check-response.ts"
)]
pub struct PermissionCheckResponse {
    pub code: String,
    pub granted: bool,
}

/// Branch scope check result.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/branch-access-response.ts"
)]
pub struct BranchAccessResponse {
    pub branch_id: String,
    pub granted: bool,
}
