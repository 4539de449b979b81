use async_trait::async_trait;
use chrono::{DateTime, Utc};

use engeserv_core::{AppResult, BranchId, TenantId};
use engeserv_domain::{EmailAddress, Invitation, InvitationId};

/// Repository port for invitation persistence.
///
/// Reads must observe the caller's own prior writes.
#[async_trait]
pub trait InvitationRepository: Send + Sync {
    /// Stores a newly issued invitation.
    async fn insert(&self, invitation: &Invitation) -> AppResult<()>;

    /// Persists status, token and expiry changes of an existing invitation.
    async fn update(&self, invitation: &Invitation) -> AppResult<()>;

    /// Finds an invitation by identifier.
    async fn find_by_id(&self, invitation_id: InvitationId) -> AppResult<Option<Invitation>>;

    /// Finds an invitation by the digest of its current token.
    async fn find_by_token_hash(&self, token_hash: &str) -> AppResult<Option<Invitation>>;

    /// Lists a company's invitations, newest first, optionally for one branch.
    async fn list_for_tenant(
        &self,
        tenant_id: TenantId,
        branch_id: Option<BranchId>,
    ) -> AppResult<Vec<Invitation>>;

    /// Finds the pending invitation for an email in a company, if any.
    async fn find_pending_by_email(
        &self,
        tenant_id: TenantId,
        email: &EmailAddress,
    ) -> AppResult<Option<Invitation>>;

    /// Moves every pending invitation whose expiry has passed to `expirado`.
    /// Returns how many changed.
    async fn expire_overdue(&self, now: DateTime<Utc>) -> AppResult<usize>;
}

/// Port for sending emails. Infrastructure provides SMTP or console implementations.
#[async_trait]
pub trait EmailService: Send + Sync {
    /// Sends a plain-text email with an optional HTML alternative.
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: Option<&str>,
    ) -> AppResult<()>;
}
