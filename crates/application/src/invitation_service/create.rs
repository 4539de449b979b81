use chrono::Utc;
use engeserv_domain::{EmailAddress, InvitationDraft, PermissionSet};
use tracing::info;

use super::token_crypto::InvitationToken;
use super::*;

impl InvitationService {
    /// Issues a pending invitation and emails the acceptance link.
    pub async fn create(
        &self,
        actor: &Actor,
        input: CreateInvitationInput,
    ) -> AppResult<Invitation> {
        self.require(actor, INVITE_PERMISSION)?;

        if input.email.trim().is_empty() {
            return Err(AppError::Validation("email is required".to_owned()));
        }
        let email = EmailAddress::new(input.email)?;

        let role = input
            .role
            .ok_or_else(|| AppError::Validation("role is required".to_owned()))?;

        let permissions = PermissionSet::parse(input.permissions)?;
        let unknown = permissions.difference(&self.resolver.role_table().catalog());
        if !unknown.is_empty() {
            return Err(AppError::Validation(format!(
                "unknown permission codes: {}",
                unknown.to_strings().join(", ")
            )));
        }

        let branch_id = self.invitation_branch(actor, input.branch_id)?;
        self.ensure_grantable(actor, role, &permissions)?;

        if self.user_repository.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "a user with email '{}' already exists",
                email.as_str()
            )));
        }

        if self
            .invitation_repository
            .find_pending_by_email(actor.tenant_id(), &email)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "a pending invitation for '{}' already exists; resend it instead",
                email.as_str()
            )));
        }

        let token = InvitationToken::generate()?;
        let invitation = Invitation::issue(
            InvitationDraft {
                tenant_id: actor.tenant_id(),
                branch_id,
                email,
                role,
                permissions,
                invited_by: actor.subject().to_owned(),
            },
            token.hash.as_str(),
            Utc::now(),
            self.ttl_days(input.ttl_days),
        )?;

        self.invitation_repository.insert(&invitation).await?;
        self.send_invitation_email(&invitation, &token.raw).await?;

        info!(
            subject = actor.subject(),
            tenant_id = %invitation.tenant_id(),
            invitation_id = %invitation.id(),
            role = invitation.role().as_str(),
            "invitation created"
        );

        Ok(invitation)
    }

    /// Resolves the branch of a new invitation. Scoped actors may only
    /// invite into their own branch.
    fn invitation_branch(
        &self,
        actor: &Actor,
        requested: Option<BranchId>,
    ) -> AppResult<Option<BranchId>> {
        if actor.role().is_global() {
            return Ok(requested);
        }

        let Some(own_branch) = actor.branch_id() else {
            return Err(AppError::Forbidden(
                "actors without a branch cannot issue invitations".to_owned(),
            ));
        };

        match requested {
            None => Ok(Some(own_branch)),
            Some(branch_id) if self.resolver.is_in_branch(actor, branch_id) => Ok(Some(branch_id)),
            Some(branch_id) => Err(AppError::Forbidden(format!(
                "cannot invite into branch '{branch_id}'"
            ))),
        }
    }

    /// Scoped actors may not grant a higher role or codes they do not hold.
    /// An empty permission list grants the role defaults on acceptance, so
    /// those are what gets checked.
    fn ensure_grantable(
        &self,
        actor: &Actor,
        role: Role,
        permissions: &PermissionSet,
    ) -> AppResult<()> {
        if actor.role().is_global() {
            return Ok(());
        }

        if role > actor.role() {
            return Err(AppError::Forbidden(format!(
                "cannot grant role '{role}' above own role '{}'",
                actor.role()
            )));
        }

        let granted = if permissions.is_empty() {
            self.resolver.role_table().permissions_for(role)
        } else {
            permissions
        };

        let exceeding = granted.difference(&self.resolver.effective_permissions(actor));
        if !exceeding.is_empty() {
            return Err(AppError::Forbidden(format!(
                "cannot grant permissions not held: {}",
                exceeding.to_strings().join(", ")
            )));
        }

        Ok(())
    }
}
