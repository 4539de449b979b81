use super::*;

fn encode_permissions(invitation: &Invitation) -> AppResult<serde_json::Value> {
    serde_json::to_value(invitation.permissions()).map_err(|error| {
        AppError::Internal(format!("failed to encode invitation permissions: {error}"))
    })
}

impl PostgresInvitationRepository {
    pub(super) async fn insert_impl(&self, invitation: &Invitation) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO invitations (
                id, company_id, branch_id, email, role, permissions, token_hash,
                status, expires_at, invited_by, created_at, updated_at, accepted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11, $12)
            "#,
        )
        .bind(invitation.id().as_uuid())
        .bind(invitation.tenant_id().as_uuid())
        .bind(invitation.branch_id().map(|branch_id| branch_id.as_uuid()))
        .bind(invitation.email().as_str())
        .bind(invitation.role().as_str())
        .bind(encode_permissions(invitation)?)
        .bind(invitation.token_hash())
        .bind(invitation.status().as_str())
        .bind(invitation.expires_at())
        .bind(invitation.invited_by())
        .bind(invitation.created_at())
        .bind(invitation.accepted_at())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            conflict_or_internal(
                error,
                "insert invitation",
                "a pending invitation for this email already exists",
            )
        })?;

        Ok(())
    }

    pub(super) async fn update_impl(&self, invitation: &Invitation) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE invitations
            SET token_hash = $2,
                status = $3,
                expires_at = $4,
                accepted_at = $5,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(invitation.id().as_uuid())
        .bind(invitation.token_hash())
        .bind(invitation.status().as_str())
        .bind(invitation.expires_at())
        .bind(invitation.accepted_at())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update invitation: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "invitation '{}' does not exist",
                invitation.id()
            )));
        }

        Ok(())
    }

    pub(super) async fn expire_overdue_impl(&self, now: DateTime<Utc>) -> AppResult<usize> {
        let result = sqlx::query(
            r#"
            UPDATE invitations
            SET status = 'expirado', updated_at = now()
            WHERE status = 'pendente' AND expires_at <= $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to expire overdue invitations: {error}"))
        })?;

        usize::try_from(result.rows_affected()).map_err(|error| {
            AppError::Internal(format!("expired invitation count overflow: {error}"))
        })
    }
}
