//! Route and view authorization gate.
//!
//! Evaluated on every navigation: public units pass, everything else needs a
//! session subject, and units declaring a requirement need that permission.

use engeserv_core::AppResult;
use engeserv_domain::{Actor, NavigationCatalog, NavigationUnit, PermissionCode};
use tracing::{debug, warn};

use crate::{PermissionResolver, SessionStore};

/// Outcome of gating one navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Let the request through. Carries the session actor for protected units.
    Allow(Option<Actor>),
    /// Authenticated, but missing the unit's permission.
    Deny {
        /// The permission the unit requires.
        required: PermissionCode,
    },
    /// No session subject; send the user to the entry surface.
    RedirectToLogin,
}

/// Session-backed gate over a navigation catalog.
#[derive(Debug, Clone)]
pub struct AuthorizationGate {
    resolver: PermissionResolver,
    catalog: NavigationCatalog,
}

impl AuthorizationGate {
    /// Creates a gate for the given catalog.
    #[must_use]
    pub fn new(resolver: PermissionResolver, catalog: NavigationCatalog) -> Self {
        Self { resolver, catalog }
    }

    /// Returns the resolver used for permission checks.
    #[must_use]
    pub fn resolver(&self) -> &PermissionResolver {
        &self.resolver
    }

    /// Returns the gated catalog.
    #[must_use]
    pub fn catalog(&self) -> &NavigationCatalog {
        &self.catalog
    }

    /// Decides whether the session may open `path`.
    ///
    /// Paths missing from the catalog are treated as protected units without
    /// a requirement.
    pub async fn evaluate(
        &self,
        session: &dyn SessionStore,
        path: &str,
    ) -> AppResult<GateDecision> {
        let unit = self.catalog.find(path);

        if unit.is_some_and(NavigationUnit::is_public) {
            return Ok(GateDecision::Allow(None));
        }

        let Some(actor) = session.get().await? else {
            debug!(path, "no session subject, redirecting to login");
            return Ok(GateDecision::RedirectToLogin);
        };

        let Some(required) = unit.and_then(NavigationUnit::required_permission) else {
            return Ok(GateDecision::Allow(Some(actor)));
        };

        if self.resolver.has_permission(Some(&actor), required) {
            return Ok(GateDecision::Allow(Some(actor)));
        }

        warn!(
            subject = actor.subject(),
            tenant_id = %actor.tenant_id(),
            path,
            permission = required.as_str(),
            "navigation denied"
        );

        Ok(GateDecision::Deny {
            required: required.clone(),
        })
    }

    /// Lists the protected units the actor may open, in catalog order.
    #[must_use]
    pub fn reachable_units(&self, actor: &Actor) -> Vec<&NavigationUnit> {
        self.catalog
            .units()
            .filter(|unit| !unit.is_public())
            .filter(|unit| {
                unit.required_permission()
                    .is_none_or(|code| self.resolver.has_permission(Some(actor), code))
            })
            .collect()
    }
}
