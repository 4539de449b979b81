//! PostgreSQL-backed invitation repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use engeserv_application::InvitationRepository;
use engeserv_core::{AppError, AppResult, BranchId, TenantId};
use engeserv_domain::{
    EmailAddress, Invitation, InvitationId, InvitationStatus, PermissionSet, Role,
    StoredInvitation,
};

use crate::conflict_or_internal;

mod lookup;
mod write;

#[cfg(test)]
mod tests;

/// PostgreSQL implementation of the invitation repository port.
#[derive(Clone)]
pub struct PostgresInvitationRepository {
    pool: PgPool,
}

impl PostgresInvitationRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const INVITATION_COLUMNS: &str = "id, company_id, branch_id, email, role, permissions, \
                                  token_hash, status, expires_at, invited_by, created_at, \
                                  accepted_at";

#[derive(Debug, sqlx::FromRow)]
struct InvitationRow {
    id: Uuid,
    company_id: Uuid,
    branch_id: Option<Uuid>,
    email: String,
    role: String,
    permissions: serde_json::Value,
    token_hash: String,
    status: String,
    expires_at: DateTime<Utc>,
    invited_by: String,
    created_at: DateTime<Utc>,
    accepted_at: Option<DateTime<Utc>>,
}

impl TryFrom<InvitationRow> for Invitation {
    type Error = AppError;

    fn try_from(row: InvitationRow) -> Result<Self, Self::Error> {
        let permissions = serde_json::from_value::<PermissionSet>(row.permissions).map_err(
            |error| {
                AppError::Internal(format!(
                    "stored permissions of invitation '{}' are invalid: {error}",
                    row.id
                ))
            },
        )?;

        Ok(Invitation::from_stored(StoredInvitation {
            id: InvitationId::from_uuid(row.id),
            tenant_id: TenantId::from_uuid(row.company_id),
            branch_id: row.branch_id.map(BranchId::from_uuid),
            email: EmailAddress::new(row.email)?,
            role: row.role.parse::<Role>()?,
            permissions,
            token_hash: row.token_hash,
            status: row.status.parse::<InvitationStatus>()?,
            expires_at: row.expires_at,
            invited_by: row.invited_by,
            created_at: row.created_at,
            accepted_at: row.accepted_at,
        }))
    }
}

fn rows_to_invitations(rows: Vec<InvitationRow>) -> AppResult<Vec<Invitation>> {
    rows.into_iter().map(Invitation::try_from).collect()
}

#[async_trait]
impl InvitationRepository for PostgresInvitationRepository {
    async fn insert(&self, invitation: &Invitation) -> AppResult<()> {
        self.insert_impl(invitation).await
    }

    async fn update(&self, invitation: &Invitation) -> AppResult<()> {
        self.update_impl(invitation).await
    }

    async fn find_by_id(&self, invitation_id: InvitationId) -> AppResult<Option<Invitation>> {
        self.find_by_id_impl(invitation_id).await
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> AppResult<Option<Invitation>> {
        self.find_by_token_hash_impl(token_hash).await
    }

    async fn list_for_tenant(
        &self,
        tenant_id: TenantId,
        branch_id: Option<BranchId>,
    ) -> AppResult<Vec<Invitation>> {
        self.list_for_tenant_impl(tenant_id, branch_id).await
    }

    async fn find_pending_by_email(
        &self,
        tenant_id: TenantId,
        email: &EmailAddress,
    ) -> AppResult<Option<Invitation>> {
        self.find_pending_by_email_impl(tenant_id, email).await
    }

    async fn expire_overdue(&self, now: DateTime<Utc>) -> AppResult<usize> {
        self.expire_overdue_impl(now).await
    }
}
