use std::fmt::{Display, Formatter};
use std::str::FromStr;

use engeserv_core::AppError;
use serde::{Deserialize, Serialize};

use crate::{PermissionCode, PermissionSet};

/// Account role. Variants are declared in privilege order, so
/// `User < Admin < Superadmin` under `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Staff member with read access to day-to-day resources.
    User,
    /// Branch administrator.
    Admin,
    /// Company-wide administrator, not bound to a branch.
    Superadmin,
}

impl Role {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::Superadmin => "superadmin",
        }
    }

    /// Returns all roles from least to most privileged.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Role] = &[Role::User, Role::Admin, Role::Superadmin];

        ALL
    }

    /// Returns whether the role has company-wide scope.
    #[must_use]
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Superadmin)
    }
}

impl Display for Role {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "superadmin" => Ok(Self::Superadmin),
            _ => Err(AppError::Validation(format!("unknown role '{value}'"))),
        }
    }
}

/// Default permission catalog per role.
///
/// One field per [`Role`] variant; `permissions_for` matches exhaustively, so
/// a new role does not compile until it has an entry here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoleBaseTable {
    user: PermissionSet,
    admin: PermissionSet,
    superadmin: PermissionSet,
}

const USER_PERMISSIONS: &[&str] = &[
    "view:dashboard",
    "view:clients",
    "view:projects",
    "view:notifications",
    "view:reports",
];

const ADMIN_PERMISSIONS: &[&str] = &[
    "create:client",
    "edit:client",
    "delete:client",
    "create:project",
    "edit:project",
    "delete:project",
    "view:users",
    "create:user",
    "edit:user",
    "invite:user",
    "view:invitations",
    "view:branches",
    "edit:branch",
    "manage:notifications",
];

const SUPERADMIN_PERMISSIONS: &[&str] = &[
    "delete:user",
    "create:branch",
    "delete:branch",
    "view:companies",
    "create:company",
    "edit:company",
    "delete:company",
    "manage:permissions",
];

impl RoleBaseTable {
    /// Creates a table from explicit per-role sets.
    #[must_use]
    pub fn new(user: PermissionSet, admin: PermissionSet, superadmin: PermissionSet) -> Self {
        Self {
            user,
            admin,
            superadmin,
        }
    }

    /// Returns the built-in catalog. Each role inherits the codes of the
    /// roles below it.
    #[must_use]
    pub fn standard() -> Self {
        let user = PermissionSet::from_catalog(USER_PERMISSIONS);
        let admin = user.union(&PermissionSet::from_catalog(ADMIN_PERMISSIONS));
        let superadmin = admin.union(&PermissionSet::from_catalog(SUPERADMIN_PERMISSIONS));

        Self::new(user, admin, superadmin)
    }

    /// Returns the default permission set of a role.
    #[must_use]
    pub fn permissions_for(&self, role: Role) -> &PermissionSet {
        match role {
            Role::User => &self.user,
            Role::Admin => &self.admin,
            Role::Superadmin => &self.superadmin,
        }
    }

    /// Returns whether the role grants the code by default.
    #[must_use]
    pub fn grants(&self, role: Role, code: &PermissionCode) -> bool {
        self.permissions_for(role).contains(code)
    }

    /// Returns every code mentioned by any role: the set of valid codes.
    #[must_use]
    pub fn catalog(&self) -> PermissionSet {
        Role::all()
            .iter()
            .fold(PermissionSet::new(), |accumulator, role| {
                accumulator.union(self.permissions_for(*role))
            })
    }
}

impl Default for RoleBaseTable {
    fn default() -> Self {
        Self::standard()
    }
}
