use async_trait::async_trait;
use engeserv_application::CompanyRepository;
use engeserv_core::{AppError, AppResult, BranchId, NonEmptyString, TenantId};
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL-backed company and branch repository.
#[derive(Clone)]
pub struct PostgresCompanyRepository {
    pool: PgPool,
}

impl PostgresCompanyRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompanyRepository for PostgresCompanyRepository {
    async fn ensure_company(&self, name: &NonEmptyString) -> AppResult<TenantId> {
        // The no-op update makes RETURNING yield the existing row on conflict.
        let company_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO companies (id, name)
            VALUES ($1, $2)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
            "#,
        )
        .bind(TenantId::new().as_uuid())
        .bind(name.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to ensure company: {error}")))?;

        Ok(TenantId::from_uuid(company_id))
    }

    async fn ensure_branch(
        &self,
        tenant_id: TenantId,
        name: &NonEmptyString,
    ) -> AppResult<BranchId> {
        let branch_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO branches (id, company_id, name)
            VALUES ($1, $2, $3)
            ON CONFLICT (company_id, name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
            "#,
        )
        .bind(BranchId::new().as_uuid())
        .bind(tenant_id.as_uuid())
        .bind(name.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to ensure branch: {error}")))?;

        Ok(BranchId::from_uuid(branch_id))
    }
}
