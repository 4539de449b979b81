use super::*;

impl PostgresInvitationRepository {
    pub(super) async fn find_by_id_impl(
        &self,
        invitation_id: InvitationId,
    ) -> AppResult<Option<Invitation>> {
        let row = sqlx::query_as::<_, InvitationRow>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations WHERE id = $1"
        ))
        .bind(invitation_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find invitation: {error}")))?;

        row.map(Invitation::try_from).transpose()
    }

    pub(super) async fn find_by_token_hash_impl(
        &self,
        token_hash: &str,
    ) -> AppResult<Option<Invitation>> {
        let row = sqlx::query_as::<_, InvitationRow>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations WHERE token_hash = $1"
        ))
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find invitation by token: {error}"))
        })?;

        row.map(Invitation::try_from).transpose()
    }

    pub(super) async fn list_for_tenant_impl(
        &self,
        tenant_id: TenantId,
        branch_id: Option<BranchId>,
    ) -> AppResult<Vec<Invitation>> {
        let rows = sqlx::query_as::<_, InvitationRow>(&format!(
            r#"
            SELECT {INVITATION_COLUMNS}
            FROM invitations
            WHERE company_id = $1
              AND ($2::uuid IS NULL OR branch_id = $2)
            ORDER BY created_at DESC
            "#
        ))
        .bind(tenant_id.as_uuid())
        .bind(branch_id.map(|branch_id| branch_id.as_uuid()))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list invitations: {error}")))?;

        rows_to_invitations(rows)
    }

    pub(super) async fn find_pending_by_email_impl(
        &self,
        tenant_id: TenantId,
        email: &EmailAddress,
    ) -> AppResult<Option<Invitation>> {
        let row = sqlx::query_as::<_, InvitationRow>(&format!(
            r#"
            SELECT {INVITATION_COLUMNS}
            FROM invitations
            WHERE company_id = $1 AND email = $2 AND status = 'pendente'
            LIMIT 1
            "#
        ))
        .bind(tenant_id.as_uuid())
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find pending invitation: {error}"))
        })?;

        row.map(Invitation::try_from).transpose()
    }
}
