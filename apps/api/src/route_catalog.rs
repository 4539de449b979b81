use engeserv_core::AppResult;
use engeserv_domain::{NavigationCatalog, NavigationUnit, PermissionCode};

/// Every HTTP route with the permission the gate checks before the handler.
///
/// Handlers and services may check more specific permissions per method.
pub fn api_catalog() -> AppResult<NavigationCatalog> {
    let requires = |code: &str| PermissionCode::new(code).map(Some);

    Ok(NavigationCatalog::new(vec![
        NavigationUnit::public("/health", "Health"),
        NavigationUnit::public("/auth/login", "Login"),
        NavigationUnit::public("/auth/logout", "Logout"),
        NavigationUnit::public("/auth/invitations/accept", "Accept invitation"),
        NavigationUnit::protected("/auth/me", "Current session", None),
        NavigationUnit::protected("/api/navigation", "Navigation", None),
        NavigationUnit::protected("/api/navigation/access", "Navigation access", None),
        NavigationUnit::protected("/api/permissions/check", "Permission check", None),
        NavigationUnit::protected("/api/branches/{branch_id}/access", "Branch access", None),
        NavigationUnit::protected(
            "/api/invitations",
            "Invitations",
            requires("view:invitations")?,
        ),
        NavigationUnit::protected(
            "/api/invitations/{invitation_id}/resend",
            "Resend invitation",
            requires("invite:user")?,
        ),
        NavigationUnit::protected(
            "/api/invitations/{invitation_id}/revoke",
            "Revoke invitation",
            requires("invite:user")?,
        ),
    ]))
}
