//! First-run seeding of the company, its head office and a superadmin.

use std::sync::Arc;

use async_trait::async_trait;

use engeserv_core::{AppResult, BranchId, NonEmptyString, TenantId};
use engeserv_domain::{EmailAddress, PermissionSet, Role, UserId, validate_password};
use tracing::info;

use crate::{NewUser, PasswordHasher, UserRepository};

/// Repository port for companies and branches.
#[async_trait]
pub trait CompanyRepository: Send + Sync {
    /// Returns the company with this name, creating it when missing.
    async fn ensure_company(&self, name: &NonEmptyString) -> AppResult<TenantId>;

    /// Returns the company's branch with this name, creating it when missing.
    async fn ensure_branch(&self, tenant_id: TenantId, name: &NonEmptyString)
    -> AppResult<BranchId>;
}

/// Seed values for the first superadmin.
#[derive(Debug, Clone)]
pub struct BootstrapRequest {
    /// Company name.
    pub company_name: String,
    /// Head office branch name.
    pub branch_name: String,
    /// Superadmin email.
    pub email: String,
    /// Superadmin plaintext password.
    pub password: String,
    /// Superadmin display name; falls back to the email local part.
    pub display_name: Option<String>,
}

/// Result of a bootstrap run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapOutcome {
    /// Seeded company.
    pub tenant_id: TenantId,
    /// Seeded head office.
    pub branch_id: BranchId,
    /// Superadmin account.
    pub user_id: UserId,
    /// Whether the account was created by this run.
    pub created: bool,
}

/// Idempotent seeding service.
#[derive(Clone)]
pub struct BootstrapService {
    company_repository: Arc<dyn CompanyRepository>,
    user_repository: Arc<dyn UserRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
}

impl BootstrapService {
    /// Creates a new bootstrap service.
    #[must_use]
    pub fn new(
        company_repository: Arc<dyn CompanyRepository>,
        user_repository: Arc<dyn UserRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            company_repository,
            user_repository,
            password_hasher,
        }
    }

    /// Ensures the company, branch and superadmin exist. An existing account
    /// with the same email is left untouched.
    pub async fn ensure_superadmin(&self, request: BootstrapRequest) -> AppResult<BootstrapOutcome> {
        let company_name = NonEmptyString::new(request.company_name)?;
        let branch_name = NonEmptyString::new(request.branch_name)?;
        let email = EmailAddress::new(request.email)?;

        let tenant_id = self.company_repository.ensure_company(&company_name).await?;
        let branch_id = self
            .company_repository
            .ensure_branch(tenant_id, &branch_name)
            .await?;

        if let Some(existing) = self.user_repository.find_by_email(&email).await? {
            info!(subject = %existing.id, "superadmin already present, skipping");
            return Ok(BootstrapOutcome {
                tenant_id,
                branch_id,
                user_id: existing.id,
                created: false,
            });
        }

        validate_password(&request.password)?;
        let password_hash = self.password_hasher.hash_password(&request.password)?;

        let display_name = request
            .display_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| email.local_part())
            .to_owned();

        let user = self
            .user_repository
            .create(NewUser {
                tenant_id,
                branch_id: Some(branch_id),
                email,
                display_name,
                password_hash,
                role: Role::Superadmin,
                permissions: PermissionSet::new(),
            })
            .await?;

        info!(subject = %user.id, tenant_id = %tenant_id, "superadmin created");

        Ok(BootstrapOutcome {
            tenant_id,
            branch_id,
            user_id: user.id,
            created: true,
        })
    }
}
