use engeserv_core::{BranchId, TenantId, UserIdentity};
use serde::{Deserialize, Serialize};

use crate::{PermissionSet, Role};

/// Authenticated subject of a session.
///
/// `override_permissions` is the explicit per-user grant list stored with the
/// account. When non-empty it replaces the role defaults entirely; when empty
/// the role defaults apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    identity: UserIdentity,
    role: Role,
    #[serde(default)]
    override_permissions: PermissionSet,
}

impl Actor {
    /// Creates an actor from its identity, role and stored override set.
    #[must_use]
    pub fn new(identity: UserIdentity, role: Role, override_permissions: PermissionSet) -> Self {
        Self {
            identity,
            role,
            override_permissions,
        }
    }

    /// Returns the identity established at login.
    #[must_use]
    pub fn identity(&self) -> &UserIdentity {
        &self.identity
    }

    /// Returns the stable subject (user id).
    #[must_use]
    pub fn subject(&self) -> &str {
        self.identity.subject()
    }

    /// Returns the company the actor belongs to.
    #[must_use]
    pub fn tenant_id(&self) -> TenantId {
        self.identity.tenant_id()
    }

    /// Returns the actor's branch, if assigned.
    #[must_use]
    pub fn branch_id(&self) -> Option<BranchId> {
        self.identity.branch_id()
    }

    /// Returns the actor's role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the explicit override set (possibly empty).
    #[must_use]
    pub fn override_permissions(&self) -> &PermissionSet {
        &self.override_permissions
    }

    /// Returns whether an explicit override replaces the role defaults.
    #[must_use]
    pub fn has_override(&self) -> bool {
        !self.override_permissions.is_empty()
    }
}
