use serde::{Deserialize, Serialize};

use crate::PermissionCode;

/// Navigable unit (dashboard page or API route) and its access requirement.
///
/// Paths may contain `{name}` placeholder segments that match any single
/// segment, e.g. `/api/invitations/{invitation_id}/resend`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationUnit {
    path: String,
    label: String,
    required_permission: Option<PermissionCode>,
    public: bool,
}

impl NavigationUnit {
    /// Creates a unit reachable by any authenticated actor holding `required`.
    #[must_use]
    pub fn protected(
        path: impl Into<String>,
        label: impl Into<String>,
        required: Option<PermissionCode>,
    ) -> Self {
        Self {
            path: path.into(),
            label: label.into(),
            required_permission: required,
            public: false,
        }
    }

    /// Creates a unit reachable without a session.
    #[must_use]
    pub fn public(path: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            label: label.into(),
            required_permission: None,
            public: true,
        }
    }

    /// Returns the path template.
    #[must_use]
    pub fn path(&self) -> &str {
        self.path.as_str()
    }

    /// Returns the human-readable label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    /// Returns the declared requirement, if any.
    #[must_use]
    pub fn required_permission(&self) -> Option<&PermissionCode> {
        self.required_permission.as_ref()
    }

    /// Returns whether the unit is on the public allow-list.
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.public
    }

    /// Returns whether a concrete request path matches this unit's template.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        let template = segments(self.path.as_str());
        let requested = segments(path);

        template.len() == requested.len()
            && template
                .iter()
                .zip(requested.iter())
                .all(|(expected, actual)| is_placeholder(expected) || expected == actual)
    }

    fn placeholder_count(&self) -> usize {
        segments(self.path.as_str())
            .iter()
            .filter(|segment| is_placeholder(segment))
            .count()
    }
}

fn segments(path: &str) -> Vec<&str> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.split('/').filter(|segment| !segment.is_empty()).collect()
}

fn is_placeholder(segment: &str) -> bool {
    segment.len() > 2 && segment.starts_with('{') && segment.ends_with('}')
}

/// Ordered set of navigable units.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationCatalog {
    units: Vec<NavigationUnit>,
}

impl NavigationCatalog {
    /// Creates a catalog from units.
    #[must_use]
    pub fn new(units: Vec<NavigationUnit>) -> Self {
        Self { units }
    }

    /// Returns the catalog with one more unit appended.
    #[must_use]
    pub fn with_unit(mut self, unit: NavigationUnit) -> Self {
        self.units.push(unit);
        self
    }

    /// Returns the dashboard pages and the permission each one requires.
    #[must_use]
    pub fn dashboard() -> Self {
        let page = |path: &str, label: &str, code: &'static str| {
            NavigationUnit::protected(path, label, Some(PermissionCode::from_catalog(code)))
        };

        Self::new(vec![
            NavigationUnit::public("/login", "Entrar"),
            NavigationUnit::public("/accept-invite", "Aceitar convite"),
            page("/dashboard", "Painel", "view:dashboard"),
            page("/dashboard/clients", "Clientes", "view:clients"),
            page("/dashboard/projects", "Projetos", "view:projects"),
            page(
                "/dashboard/notifications",
                "Notificações",
                "view:notifications",
            ),
            page("/dashboard/reports", "Relatórios", "view:reports"),
            page("/dashboard/users", "Usuários", "view:users"),
            page("/dashboard/invitations", "Convites", "view:invitations"),
            page("/dashboard/branches", "Filiais", "view:branches"),
            page("/dashboard/companies", "Empresas", "view:companies"),
            page("/dashboard/permissions", "Permissões", "manage:permissions"),
            NavigationUnit::protected("/dashboard/profile", "Perfil", None),
        ])
    }

    /// Finds the unit for a request path. Literal segments win over
    /// placeholders when several templates match.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<&NavigationUnit> {
        self.units
            .iter()
            .filter(|unit| unit.matches(path))
            .min_by_key(|unit| unit.placeholder_count())
    }

    /// Iterates all units in declaration order.
    pub fn units(&self) -> impl Iterator<Item = &NavigationUnit> {
        self.units.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{NavigationCatalog, NavigationUnit};
    use crate::PermissionCode;

    #[test]
    fn templates_match_single_segments_only() {
        let unit = NavigationUnit::protected("/api/invitations/{invitation_id}/resend", "", None);

        assert!(unit.matches("/api/invitations/4f1c/resend"));
        assert!(unit.matches("/api/invitations/4f1c/resend?source=email"));
        assert!(!unit.matches("/api/invitations/resend"));
        assert!(!unit.matches("/api/invitations/4f1c/revoke"));
    }

    #[test]
    fn trailing_slashes_are_ignored() {
        let unit = NavigationUnit::public("/login", "Entrar");
        assert!(unit.matches("/login/"));
    }

    #[test]
    fn literal_template_wins_over_placeholder() {
        let catalog = NavigationCatalog::default()
            .with_unit(NavigationUnit::protected("/api/items/{id}", "item", None))
            .with_unit(NavigationUnit::protected(
                "/api/items/export",
                "export",
                Some(PermissionCode::from_catalog("view:reports")),
            ));

        let found = catalog.find("/api/items/export").map(NavigationUnit::label);
        assert_eq!(found, Some("export"));
    }

    #[test]
    fn dashboard_catalog_gates_users_page() {
        let catalog = NavigationCatalog::dashboard();
        let unit = catalog.find("/dashboard/users");

        assert_eq!(
            unit.and_then(NavigationUnit::required_permission)
                .map(PermissionCode::as_str),
            Some("view:users")
        );
        assert!(catalog.find("/login").is_some_and(NavigationUnit::is_public));
    }
}
