mod access;
mod auth;
mod common;
mod invitations;

pub use access::{
    BranchAccessResponse, NavigationAccessQuery, NavigationAccessResponse, NavigationItemResponse,
    PermissionCheckRequest, PermissionCheckResponse,
};
pub use auth::{AcceptInvitationRequest, AcceptedInvitationResponse, LoginRequest, SessionResponse};
pub use common::HealthResponse;
pub use invitations::{CreateInvitationRequest, InvitationResponse, ResendInvitationRequest};

#[cfg(test)]
mod tests {
    use super::{
        AcceptInvitationRequest, AcceptedInvitationResponse, BranchAccessResponse,
        CreateInvitationRequest, HealthResponse, InvitationResponse, LoginRequest,
        NavigationAccessResponse, NavigationItemResponse, PermissionCheckRequest,
        PermissionCheckResponse, ResendInvitationRequest, SessionResponse,
    };

    use crate::error::ErrorResponse;
    use ts_rs::Config;
    use ts_rs::TS;

    #[test]
    fn export_ts_bindings() -> Result<(), ts_rs::ExportError> {
        let config = Config::default();

        ErrorResponse::export(&config)?;
        HealthResponse::export(&config)?;
        LoginRequest::export(&config)?;
        SessionResponse::export(&config)?;
        AcceptInvitationRequest::export(&config)?;
        AcceptedInvitationResponse::export(&config)?;
        NavigationItemResponse::export(&config)?;
        NavigationAccessResponse::export(&config)?;
        PermissionCheckRequest::export(&config)?;
        PermissionCheckResponse::export(&config)?;
        BranchAccessResponse::export(&config)?;
        CreateInvitationRequest::export(&config)?;
        ResendInvitationRequest::export(&config)?;
        InvitationResponse::export(&config)?;

        Ok(())
    }
}
