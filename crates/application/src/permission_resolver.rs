//! Permission and branch-scope resolution.
//!
//! Effective permissions are the actor's explicit override set when it is
//! non-empty, otherwise the role defaults from the injected table. The two
//! sources never merge.

use std::sync::Arc;

use engeserv_core::{AppError, AppResult, BranchId};
use engeserv_domain::{Actor, PermissionCode, PermissionSet, RoleBaseTable};

/// Pure resolver over an immutable role table.
#[derive(Debug, Clone)]
pub struct PermissionResolver {
    role_table: Arc<RoleBaseTable>,
}

impl PermissionResolver {
    /// Creates a resolver over the given role table.
    #[must_use]
    pub fn new(role_table: Arc<RoleBaseTable>) -> Self {
        Self { role_table }
    }

    /// Returns the role table this resolver consults.
    #[must_use]
    pub fn role_table(&self) -> &RoleBaseTable {
        &self.role_table
    }

    /// Returns whether the actor holds `code`. An absent actor holds nothing.
    #[must_use]
    pub fn has_permission(&self, actor: Option<&Actor>, code: &PermissionCode) -> bool {
        let Some(actor) = actor else {
            return false;
        };

        if actor.has_override() {
            return actor.override_permissions().contains(code);
        }

        self.role_table.grants(actor.role(), code)
    }

    /// Returns whether the actor may act on data of `branch_id`.
    #[must_use]
    pub fn is_in_branch(&self, actor: &Actor, branch_id: BranchId) -> bool {
        actor.role().is_global() || actor.branch_id() == Some(branch_id)
    }

    /// Returns the full set of codes the actor holds.
    #[must_use]
    pub fn effective_permissions(&self, actor: &Actor) -> PermissionSet {
        if actor.has_override() {
            return actor.override_permissions().clone();
        }

        self.role_table.permissions_for(actor.role()).clone()
    }

    /// Fails with `Forbidden` when the actor lacks `code`.
    pub fn require_permission(&self, actor: &Actor, code: &PermissionCode) -> AppResult<()> {
        if self.has_permission(Some(actor), code) {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "subject '{}' is missing permission '{code}'",
            actor.subject()
        )))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use engeserv_core::{BranchId, TenantId, UserIdentity};
    use engeserv_domain::{Actor, PermissionCode, PermissionSet, Role, RoleBaseTable};
    use proptest::prelude::*;

    use super::PermissionResolver;

    fn resolver() -> PermissionResolver {
        PermissionResolver::new(Arc::new(RoleBaseTable::standard()))
    }

    fn code(value: &str) -> PermissionCode {
        PermissionCode::new(value).unwrap_or_else(|_| panic!("invalid test code '{value}'"))
    }

    fn actor(role: Role, branch_id: Option<BranchId>, overrides: &[&str]) -> Actor {
        let overrides = PermissionSet::parse(overrides.iter().copied())
            .unwrap_or_else(|_| panic!("invalid test overrides"));

        Actor::new(
            UserIdentity::new("subject-1", "Test", None, TenantId::new(), branch_id),
            role,
            overrides,
        )
    }

    fn catalog_codes() -> Vec<PermissionCode> {
        RoleBaseTable::standard().catalog().into_iter().collect()
    }

    fn any_role() -> impl Strategy<Value = Role> {
        prop_oneof![Just(Role::User), Just(Role::Admin), Just(Role::Superadmin)]
    }

    #[test]
    fn plain_user_sees_clients_but_cannot_delete_users() {
        let resolver = resolver();
        let user = actor(Role::User, None, &[]);

        assert!(resolver.has_permission(Some(&user), &code("view:clients")));
        assert!(!resolver.has_permission(Some(&user), &code("delete:user")));
    }

    #[test]
    fn override_replaces_admin_defaults() {
        let resolver = resolver();
        let admin = actor(Role::Admin, None, &["view:dashboard"]);

        assert!(resolver.has_permission(Some(&admin), &code("view:dashboard")));
        assert!(!resolver.has_permission(Some(&admin), &code("delete:project")));
    }

    #[test]
    fn override_can_grant_codes_beyond_the_role() {
        let resolver = resolver();
        let user = actor(Role::User, None, &["delete:company"]);

        assert!(resolver.has_permission(Some(&user), &code("delete:company")));
        assert!(!resolver.has_permission(Some(&user), &code("view:dashboard")));
    }

    #[test]
    fn require_permission_maps_denial_to_forbidden() {
        let resolver = resolver();
        let user = actor(Role::User, None, &[]);

        let result = resolver.require_permission(&user, &code("invite:user"));
        assert!(matches!(result, Err(engeserv_core::AppError::Forbidden(_))));
        assert!(resolver.require_permission(&user, &code("view:reports")).is_ok());
    }

    #[test]
    fn alternate_catalogs_can_be_injected() {
        let table = RoleBaseTable::new(
            PermissionSet::parse(["view:reports"]).unwrap_or_default(),
            PermissionSet::new(),
            PermissionSet::new(),
        );
        let resolver = PermissionResolver::new(Arc::new(table));

        assert!(resolver.has_permission(Some(&actor(Role::User, None, &[])), &code("view:reports")));
        assert!(!resolver.has_permission(
            Some(&actor(Role::Superadmin, None, &[])),
            &code("view:reports")
        ));
    }

    #[test]
    fn effective_permissions_follow_the_override_rule() {
        let resolver = resolver();
        let admin = actor(Role::Admin, None, &[]);
        let restricted = actor(Role::Admin, None, &["view:dashboard"]);

        assert_eq!(
            &resolver.effective_permissions(&admin),
            RoleBaseTable::standard().permissions_for(Role::Admin)
        );
        assert_eq!(
            resolver.effective_permissions(&restricted).to_strings(),
            vec!["view:dashboard"]
        );
    }

    proptest! {
        #[test]
        fn absent_actor_is_always_denied(index in 0usize..64) {
            let codes = catalog_codes();
            let code = &codes[index % codes.len()];
            prop_assert!(!resolver().has_permission(None, code));
        }

        #[test]
        fn empty_override_matches_role_table(role in any_role(), index in 0usize..64) {
            let codes = catalog_codes();
            let code = &codes[index % codes.len()];
            let table = RoleBaseTable::standard();

            prop_assert_eq!(
                resolver().has_permission(Some(&actor(role, None, &[])), code),
                table.permissions_for(role).contains(code)
            );
        }

        #[test]
        fn non_empty_override_is_authoritative(
            role in any_role(),
            picks in proptest::collection::btree_set(0usize..64, 1..6),
            index in 0usize..64,
        ) {
            let codes = catalog_codes();
            let overrides = picks
                .iter()
                .map(|pick| codes[pick % codes.len()].clone())
                .collect::<PermissionSet>();
            let subject = Actor::new(
                UserIdentity::new("subject-1", "Test", None, TenantId::new(), None),
                role,
                overrides.clone(),
            );
            let code = &codes[index % codes.len()];

            prop_assert_eq!(
                resolver().has_permission(Some(&subject), code),
                overrides.contains(code)
            );
        }

        #[test]
        fn superadmin_is_in_every_branch(own in proptest::option::of(any::<u128>()), other in any::<u128>()) {
            let own = own.map(|value| BranchId::from_uuid(uuid_from(value)));
            let superadmin = actor(Role::Superadmin, own, &[]);

            prop_assert!(resolver().is_in_branch(&superadmin, BranchId::from_uuid(uuid_from(other))));
        }

        #[test]
        fn scoped_roles_are_confined_to_their_branch(
            role in prop_oneof![Just(Role::User), Just(Role::Admin)],
            own in any::<u128>(),
            other in any::<u128>(),
        ) {
            prop_assume!(own != other);
            let own = BranchId::from_uuid(uuid_from(own));
            let scoped = actor(role, Some(own), &[]);

            prop_assert!(resolver().is_in_branch(&scoped, own));
            prop_assert!(!resolver().is_in_branch(&scoped, BranchId::from_uuid(uuid_from(other))));
        }
    }

    #[test]
    fn actor_without_branch_is_outside_every_branch() {
        let admin = actor(Role::Admin, None, &[]);
        assert!(!resolver().is_in_branch(&admin, BranchId::new()));
    }

    fn uuid_from(value: u128) -> uuid::Uuid {
        uuid::Uuid::from_u128(value)
    }
}
