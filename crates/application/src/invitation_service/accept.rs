use chrono::Utc;
use engeserv_domain::validate_password;
use tracing::{info, warn};

use super::token_crypto::hash_token;
use super::*;
use crate::{NewUser, UserRecord};

impl InvitationService {
    /// Redeems an invitation token and creates the invitee's account with the
    /// invitation's role, branch and permission override.
    pub async fn accept(&self, input: AcceptInvitationInput) -> AppResult<UserRecord> {
        if input.token.trim().is_empty() {
            return Err(AppError::Validation("token is required".to_owned()));
        }

        let mut invitation = self
            .invitation_repository
            .find_by_token_hash(&hash_token(&input.token))
            .await?
            .ok_or_else(|| AppError::NotFound("invitation token is not valid".to_owned()))?;

        let now = Utc::now();
        if invitation.expire_if_overdue(now) {
            self.invitation_repository.update(&invitation).await?;
            warn!(invitation_id = %invitation.id(), "overdue invitation presented");
            return Err(AppError::Unauthorized("invitation has expired".to_owned()));
        }

        if invitation.status().is_terminal() {
            return Err(AppError::Conflict(format!(
                "invitation is already '{}'",
                invitation.status().as_str()
            )));
        }

        validate_password(&input.password)?;

        if self
            .user_repository
            .find_by_email(invitation.email())
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "a user with email '{}' already exists",
                invitation.email().as_str()
            )));
        }

        let display_name = input
            .display_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| invitation.email().local_part())
            .to_owned();

        let password_hash = self.password_hasher.hash_password(&input.password)?;

        invitation.accept(now)?;

        let user = self
            .user_repository
            .create(NewUser {
                tenant_id: invitation.tenant_id(),
                branch_id: invitation.branch_id(),
                email: invitation.email().clone(),
                display_name,
                password_hash,
                role: invitation.role(),
                permissions: invitation.permissions().clone(),
            })
            .await?;

        self.invitation_repository.update(&invitation).await?;

        info!(
            subject = %user.id,
            tenant_id = %user.tenant_id,
            invitation_id = %invitation.id(),
            "invitation accepted"
        );

        Ok(user)
    }
}
