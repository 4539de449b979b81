use chrono::{DateTime, Utc};
use tracing::info;

use super::token_crypto::InvitationToken;
use super::*;

impl InvitationService {
    /// Issues a fresh token and expiry for a pending invitation and emails
    /// the new link. The previous token stops working. An invitation past its
    /// expiry is moved to `expirado` and rejected, whether or not the sweep
    /// has reached it yet.
    pub async fn resend(
        &self,
        actor: &Actor,
        invitation_id: InvitationId,
        ttl_days: Option<u32>,
    ) -> AppResult<Invitation> {
        self.require(actor, INVITE_PERMISSION)?;

        let mut invitation = self.managed_invitation(actor, invitation_id).await?;

        let now = Utc::now();
        if invitation.expire_if_overdue(now) {
            self.invitation_repository.update(&invitation).await?;
            return Err(AppError::Conflict(format!(
                "invitation '{}' has expired and cannot be resent",
                invitation.id()
            )));
        }

        let token = InvitationToken::generate()?;
        invitation.reissue(token.hash.as_str(), now, self.ttl_days(ttl_days))?;
        self.invitation_repository.update(&invitation).await?;
        self.send_invitation_email(&invitation, &token.raw).await?;

        info!(
            subject = actor.subject(),
            invitation_id = %invitation.id(),
            expires_at = %invitation.expires_at(),
            "invitation resent"
        );

        Ok(invitation)
    }

    /// Moves a pending invitation to `expirado`. Revoking an already expired
    /// invitation succeeds without changes.
    pub async fn revoke(&self, actor: &Actor, invitation_id: InvitationId) -> AppResult<Invitation> {
        self.require(actor, INVITE_PERMISSION)?;

        let mut invitation = self.managed_invitation(actor, invitation_id).await?;

        if invitation.revoke()? {
            self.invitation_repository.update(&invitation).await?;
            info!(
                subject = actor.subject(),
                invitation_id = %invitation.id(),
                "invitation revoked"
            );
        }

        Ok(invitation)
    }

    /// Expires every overdue pending invitation. Returns how many changed.
    pub async fn expire_overdue(&self, now: DateTime<Utc>) -> AppResult<usize> {
        let expired = self.invitation_repository.expire_overdue(now).await?;

        if expired > 0 {
            info!(expired, "expired overdue invitations");
        }

        Ok(expired)
    }
}
