//! User account ports.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use engeserv_core::{AppResult, BranchId, TenantId, UserIdentity};
use engeserv_domain::{Actor, EmailAddress, PermissionSet, Role, UserId};

/// User record returned by repository queries.
#[derive(Debug, Clone)]
pub struct UserRecord {
    /// Unique user identifier.
    pub id: UserId,
    /// Company the user belongs to.
    pub tenant_id: TenantId,
    /// Branch assignment, if any.
    pub branch_id: Option<BranchId>,
    /// Canonical email address.
    pub email: EmailAddress,
    /// Display name.
    pub display_name: String,
    /// Argon2id password hash.
    pub password_hash: String,
    /// Assigned role.
    pub role: Role,
    /// Explicit permission override; empty means role defaults.
    pub permissions: PermissionSet,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Builds the session actor for this account.
    #[must_use]
    pub fn to_actor(&self) -> Actor {
        Actor::new(
            UserIdentity::new(
                self.id.to_string(),
                self.display_name.clone(),
                Some(self.email.as_str().to_owned()),
                self.tenant_id,
                self.branch_id,
            ),
            self.role,
            self.permissions.clone(),
        )
    }
}

/// Input for creating a user account.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Company the user joins.
    pub tenant_id: TenantId,
    /// Branch assignment, if any.
    pub branch_id: Option<BranchId>,
    /// Canonical email address.
    pub email: EmailAddress,
    /// Display name.
    pub display_name: String,
    /// Already-hashed password.
    pub password_hash: String,
    /// Assigned role.
    pub role: Role,
    /// Explicit permission override, seeded once at creation.
    pub permissions: PermissionSet,
}

/// Repository port for user persistence.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds a user by canonical email.
    async fn find_by_email(&self, email: &EmailAddress) -> AppResult<Option<UserRecord>>;

    /// Finds a user by identifier.
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>>;

    /// Creates a user. Fails with `Conflict` when the email is taken.
    async fn create(&self, user: NewUser) -> AppResult<UserRecord>;
}

/// Port for password hashing. Keeps the application layer free of direct
/// cryptographic library coupling.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password.
    fn hash_password(&self, password: &str) -> AppResult<String>;

    /// Verifies a plaintext password against a stored hash.
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;
}
