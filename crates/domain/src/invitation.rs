use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use engeserv_core::{AppError, AppResult, BranchId, TenantId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EmailAddress, PermissionSet, Role};

/// Longest accepted invitation lifetime.
pub const INVITATION_MAX_TTL_DAYS: u32 = 90;

/// Unique identifier for an invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvitationId(Uuid);

impl InvitationId {
    /// Creates a new random invitation identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an invitation identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for InvitationId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for InvitationId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for InvitationId {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value).map(Self).map_err(|error| {
            AppError::Validation(format!("invalid invitation id '{value}': {error}"))
        })
    }
}

/// Invitation status. `Accepted` and `Expired` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvitationStatus {
    /// Waiting for the invitee.
    #[serde(rename = "pendente")]
    Pending,
    /// Redeemed; the account exists.
    #[serde(rename = "aceito")]
    Accepted,
    /// Lapsed or revoked.
    #[serde(rename = "expirado")]
    Expired,
}

impl InvitationStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pendente",
            Self::Accepted => "aceito",
            Self::Expired => "expirado",
        }
    }

    /// Returns whether no further transition is possible.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl FromStr for InvitationStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pendente" => Ok(Self::Pending),
            "aceito" => Ok(Self::Accepted),
            "expirado" => Ok(Self::Expired),
            _ => Err(AppError::Validation(format!(
                "unknown invitation status '{value}'"
            ))),
        }
    }
}

/// Validated fields of a new invitation.
#[derive(Debug, Clone)]
pub struct InvitationDraft {
    /// Company the invitee joins.
    pub tenant_id: TenantId,
    /// Branch the invitee is assigned to.
    pub branch_id: Option<BranchId>,
    /// Invitee address.
    pub email: EmailAddress,
    /// Role granted on acceptance.
    pub role: Role,
    /// Explicit permission set granted on acceptance; empty means role defaults.
    pub permissions: PermissionSet,
    /// Subject of the inviting actor.
    pub invited_by: String,
}

/// Persisted invitation fields, used by repositories to rebuild an
/// [`Invitation`] without re-running creation rules.
#[derive(Debug, Clone)]
pub struct StoredInvitation {
    /// Invitation id.
    pub id: InvitationId,
    /// Company the invitee joins.
    pub tenant_id: TenantId,
    /// Branch assignment.
    pub branch_id: Option<BranchId>,
    /// Invitee address.
    pub email: EmailAddress,
    /// Role granted on acceptance.
    pub role: Role,
    /// Permission set granted on acceptance.
    pub permissions: PermissionSet,
    /// SHA-256 hex digest of the current token.
    pub token_hash: String,
    /// Current status.
    pub status: InvitationStatus,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
    /// Subject of the inviting actor.
    pub invited_by: String,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Acceptance instant, once accepted.
    pub accepted_at: Option<DateTime<Utc>>,
}

/// Pending, time-limited, single-use access grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invitation {
    id: InvitationId,
    tenant_id: TenantId,
    branch_id: Option<BranchId>,
    email: EmailAddress,
    role: Role,
    permissions: PermissionSet,
    token_hash: String,
    status: InvitationStatus,
    expires_at: DateTime<Utc>,
    invited_by: String,
    created_at: DateTime<Utc>,
    accepted_at: Option<DateTime<Utc>>,
}

impl Invitation {
    /// Issues a new pending invitation expiring `ttl_days` after `now`.
    pub fn issue(
        draft: InvitationDraft,
        token_hash: impl Into<String>,
        now: DateTime<Utc>,
        ttl_days: u32,
    ) -> AppResult<Self> {
        let expires_at = expiry_after(now, ttl_days)?;

        Ok(Self {
            id: InvitationId::new(),
            tenant_id: draft.tenant_id,
            branch_id: draft.branch_id,
            email: draft.email,
            role: draft.role,
            permissions: draft.permissions,
            token_hash: token_hash.into(),
            status: InvitationStatus::Pending,
            expires_at,
            invited_by: draft.invited_by,
            created_at: now,
            accepted_at: None,
        })
    }

    /// Rebuilds an invitation from storage.
    #[must_use]
    pub fn from_stored(stored: StoredInvitation) -> Self {
        Self {
            id: stored.id,
            tenant_id: stored.tenant_id,
            branch_id: stored.branch_id,
            email: stored.email,
            role: stored.role,
            permissions: stored.permissions,
            token_hash: stored.token_hash,
            status: stored.status,
            expires_at: stored.expires_at,
            invited_by: stored.invited_by,
            created_at: stored.created_at,
            accepted_at: stored.accepted_at,
        }
    }

    /// Returns the invitation id.
    #[must_use]
    pub fn id(&self) -> InvitationId {
        self.id
    }

    /// Returns the company the invitee joins.
    #[must_use]
    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    /// Returns the branch assignment.
    #[must_use]
    pub fn branch_id(&self) -> Option<BranchId> {
        self.branch_id
    }

    /// Returns the invitee address.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns the role granted on acceptance.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the permission set granted on acceptance.
    #[must_use]
    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    /// Returns the digest of the current token.
    #[must_use]
    pub fn token_hash(&self) -> &str {
        self.token_hash.as_str()
    }

    /// Returns the current status.
    #[must_use]
    pub fn status(&self) -> InvitationStatus {
        self.status
    }

    /// Returns the expiry instant.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns the inviting subject.
    #[must_use]
    pub fn invited_by(&self) -> &str {
        self.invited_by.as_str()
    }

    /// Returns the creation instant.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the acceptance instant.
    #[must_use]
    pub fn accepted_at(&self) -> Option<DateTime<Utc>> {
        self.accepted_at
    }

    /// Returns whether the expiry instant has passed.
    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Replaces the token and pushes the expiry to `now + ttl_days`.
    ///
    /// Only pending invitations can be reissued; an overdue but still pending
    /// invitation is revived by this call.
    pub fn reissue(
        &mut self,
        token_hash: impl Into<String>,
        now: DateTime<Utc>,
        ttl_days: u32,
    ) -> AppResult<()> {
        self.ensure_pending("resent")?;

        self.expires_at = expiry_after(now, ttl_days)?;
        self.token_hash = token_hash.into();
        Ok(())
    }

    /// Moves a pending invitation to `Expired`.
    ///
    /// Returns `false` when the invitation was already expired.
    pub fn revoke(&mut self) -> AppResult<bool> {
        match self.status {
            InvitationStatus::Pending => {
                self.status = InvitationStatus::Expired;
                Ok(true)
            }
            InvitationStatus::Expired => Ok(false),
            InvitationStatus::Accepted => Err(AppError::Conflict(format!(
                "invitation '{}' was already accepted and cannot be revoked",
                self.id
            ))),
        }
    }

    /// Expires the invitation when pending and overdue. Returns whether the
    /// status changed.
    pub fn expire_if_overdue(&mut self, now: DateTime<Utc>) -> bool {
        if self.status == InvitationStatus::Pending && self.is_overdue(now) {
            self.status = InvitationStatus::Expired;
            return true;
        }

        false
    }

    /// Marks a pending, non-overdue invitation as accepted.
    pub fn accept(&mut self, now: DateTime<Utc>) -> AppResult<()> {
        self.ensure_pending("accepted")?;

        if self.is_overdue(now) {
            return Err(AppError::Unauthorized(
                "invitation has expired".to_owned(),
            ));
        }

        self.status = InvitationStatus::Accepted;
        self.accepted_at = Some(now);
        Ok(())
    }

    fn ensure_pending(&self, operation: &str) -> AppResult<()> {
        if self.status.is_terminal() {
            return Err(AppError::Conflict(format!(
                "invitation '{}' is '{}' and cannot be {operation}",
                self.id,
                self.status.as_str()
            )));
        }

        Ok(())
    }
}

fn expiry_after(now: DateTime<Utc>, ttl_days: u32) -> AppResult<DateTime<Utc>> {
    if ttl_days == 0 || ttl_days > INVITATION_MAX_TTL_DAYS {
        return Err(AppError::Validation(format!(
            "invitation lifetime must be between 1 and {INVITATION_MAX_TTL_DAYS} days"
        )));
    }

    Ok(now + Duration::days(i64::from(ttl_days)))
}
