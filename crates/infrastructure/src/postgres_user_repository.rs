//! PostgreSQL-backed user repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use engeserv_application::{NewUser, UserRecord, UserRepository};
use engeserv_core::{AppError, AppResult, BranchId, TenantId};
use engeserv_domain::{EmailAddress, PermissionSet, Role, UserId};

use crate::conflict_or_internal;

/// PostgreSQL implementation of the user repository port.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    company_id: Uuid,
    branch_id: Option<Uuid>,
    email: String,
    display_name: String,
    password_hash: String,
    role: String,
    permissions: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let permissions = serde_json::from_value::<PermissionSet>(row.permissions).map_err(
            |error| {
                AppError::Internal(format!(
                    "stored permissions of user '{}' are invalid: {error}",
                    row.id
                ))
            },
        )?;

        Ok(Self {
            id: UserId::from_uuid(row.id),
            tenant_id: TenantId::from_uuid(row.company_id),
            branch_id: row.branch_id.map(BranchId::from_uuid),
            email: EmailAddress::new(row.email)?,
            display_name: row.display_name,
            password_hash: row.password_hash,
            role: row.role.parse::<Role>()?,
            permissions,
            created_at: row.created_at,
        })
    }
}

const USER_COLUMNS: &str = "id, company_id, branch_id, email, display_name, password_hash, \
                            role, permissions, created_at";

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &EmailAddress) -> AppResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 LIMIT 1"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find user by email: {error}")))?;

        row.map(UserRecord::try_from).transpose()
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find user by id: {error}")))?;

        row.map(UserRecord::try_from).transpose()
    }

    async fn create(&self, user: NewUser) -> AppResult<UserRecord> {
        let permissions = serde_json::to_value(&user.permissions).map_err(|error| {
            AppError::Internal(format!("failed to encode user permissions: {error}"))
        })?;

        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (
                id, company_id, branch_id, email, display_name, password_hash, role, permissions
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(UserId::new().as_uuid())
        .bind(user.tenant_id.as_uuid())
        .bind(user.branch_id.map(|branch_id| branch_id.as_uuid()))
        .bind(user.email.as_str())
        .bind(user.display_name.as_str())
        .bind(user.password_hash.as_str())
        .bind(user.role.as_str())
        .bind(permissions)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            conflict_or_internal(
                error,
                "create user",
                "an account with this email already exists",
            )
        })?;

        UserRecord::try_from(row)
    }
}
