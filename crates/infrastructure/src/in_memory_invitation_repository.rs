use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use engeserv_application::InvitationRepository;
use engeserv_core::{AppError, AppResult, BranchId, TenantId};
use engeserv_domain::{EmailAddress, Invitation, InvitationId, InvitationStatus};
use tokio::sync::RwLock;

/// In-memory invitation repository keyed by invitation id.
#[derive(Debug, Default)]
pub struct InMemoryInvitationRepository {
    invitations: RwLock<HashMap<InvitationId, Invitation>>,
}

impl InMemoryInvitationRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn is_pending_for(invitation: &Invitation, tenant_id: TenantId, email: &EmailAddress) -> bool {
    invitation.tenant_id() == tenant_id
        && invitation.email() == email
        && invitation.status() == InvitationStatus::Pending
}

#[async_trait]
impl InvitationRepository for InMemoryInvitationRepository {
    async fn insert(&self, invitation: &Invitation) -> AppResult<()> {
        let mut invitations = self.invitations.write().await;

        if invitations.values().any(|existing| {
            existing.token_hash() == invitation.token_hash()
                || (invitation.status() == InvitationStatus::Pending
                    && is_pending_for(existing, invitation.tenant_id(), invitation.email()))
        }) {
            return Err(AppError::Conflict(
                "a pending invitation for this email already exists".to_owned(),
            ));
        }

        invitations.insert(invitation.id(), invitation.clone());
        Ok(())
    }

    async fn update(&self, invitation: &Invitation) -> AppResult<()> {
        let mut invitations = self.invitations.write().await;
        let Some(stored) = invitations.get_mut(&invitation.id()) else {
            return Err(AppError::NotFound(format!(
                "invitation '{}' does not exist",
                invitation.id()
            )));
        };

        *stored = invitation.clone();
        Ok(())
    }

    async fn find_by_id(&self, invitation_id: InvitationId) -> AppResult<Option<Invitation>> {
        Ok(self.invitations.read().await.get(&invitation_id).cloned())
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> AppResult<Option<Invitation>> {
        Ok(self
            .invitations
            .read()
            .await
            .values()
            .find(|invitation| invitation.token_hash() == token_hash)
            .cloned())
    }

    async fn list_for_tenant(
        &self,
        tenant_id: TenantId,
        branch_id: Option<BranchId>,
    ) -> AppResult<Vec<Invitation>> {
        let invitations = self.invitations.read().await;

        let mut values: Vec<Invitation> = invitations
            .values()
            .filter(|invitation| invitation.tenant_id() == tenant_id)
            .filter(|invitation| branch_id.is_none() || invitation.branch_id() == branch_id)
            .cloned()
            .collect();
        values.sort_by_key(|invitation| std::cmp::Reverse(invitation.created_at()));

        Ok(values)
    }

    async fn find_pending_by_email(
        &self,
        tenant_id: TenantId,
        email: &EmailAddress,
    ) -> AppResult<Option<Invitation>> {
        Ok(self
            .invitations
            .read()
            .await
            .values()
            .find(|invitation| is_pending_for(invitation, tenant_id, email))
            .cloned())
    }

    async fn expire_overdue(&self, now: DateTime<Utc>) -> AppResult<usize> {
        let mut invitations = self.invitations.write().await;

        Ok(invitations
            .values_mut()
            .map(|invitation| invitation.expire_if_overdue(now))
            .filter(|expired| *expired)
            .count())
    }
}
