use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::{Extension, Path, Query, State};
use axum::http::{HeaderValue, Method, Request, StatusCode, header};
use axum::response::Response;
use axum::{Json, Router};
use engeserv_application::{
    AuthorizationGate, EmailService, InvitationService, InvitationSettings, NewUser,
    PasswordHasher, PermissionResolver, SessionService, SessionStore, UserRepository,
};
use engeserv_core::{AppError, AppResult, BranchId, TenantId};
use engeserv_domain::{Actor, EmailAddress, NavigationCatalog, PermissionSet, Role, RoleBaseTable};
use engeserv_infrastructure::{
    Argon2PasswordHasher, InMemoryInvitationRepository, InMemoryUserRepository,
};
use tokio::sync::Mutex;
use tower::ServiceExt;
use tower_sessions::{MemoryStore, Session, SessionManagerLayer};
use uuid::Uuid;

use super::access::{
    branch_access_handler, check_permission_handler, navigation_access_handler,
    navigation_handler,
};
use super::auth::{accept_invitation_handler, login_handler, logout_handler, me_handler};
use super::invitations::{
    create_invitation_handler, list_invitations_handler, revoke_invitation_handler,
};
use crate::api_router::build_router;
use crate::dto::{
    AcceptInvitationRequest, CreateInvitationRequest, LoginRequest, NavigationAccessQuery,
    PermissionCheckRequest,
};
use crate::error::{ApiError, ApiResult};
use crate::route_catalog::api_catalog;
use crate::session_store::TowerSessionStore;
use crate::state::AppState;

const PASSWORD: &str = "concreto-armado-42";
const ORIGIN: &str = "http://localhost:3000";

#[derive(Default)]
struct RecordingEmailService {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingEmailService {
    async fn last_token(&self) -> Option<String> {
        let sent = self.sent.lock().await;
        let (_, body) = sent.last()?;
        let (_, tail) = body.split_once("token=")?;
        Some(tail.chars().take_while(char::is_ascii_hexdigit).collect())
    }
}

#[async_trait]
impl EmailService for RecordingEmailService {
    async fn send_email(
        &self,
        to: &str,
        _subject: &str,
        text_body: &str,
        _html_body: Option<&str>,
    ) -> AppResult<()> {
        self.sent
            .lock()
            .await
            .push((to.to_owned(), text_body.to_owned()));
        Ok(())
    }
}

struct Fixture {
    state: AppState,
    users: Arc<InMemoryUserRepository>,
    hasher: Arc<Argon2PasswordHasher>,
    emails: Arc<RecordingEmailService>,
    tenant_id: TenantId,
    branch_id: BranchId,
}

impl Fixture {
    fn new() -> AppResult<Self> {
        let resolver = PermissionResolver::new(Arc::new(RoleBaseTable::standard()));
        let users = Arc::new(InMemoryUserRepository::new());
        let hasher = Arc::new(Argon2PasswordHasher::with_params(1024, 1, 1)?);
        let emails = Arc::new(RecordingEmailService::default());

        let invitation_service = InvitationService::new(
            Arc::new(InMemoryInvitationRepository::new()),
            users.clone(),
            hasher.clone(),
            emails.clone(),
            resolver.clone(),
            InvitationSettings::default(),
        );

        let state = AppState {
            session_service: SessionService::new(users.clone(), hasher.clone()),
            invitation_service,
            api_gate: AuthorizationGate::new(resolver.clone(), api_catalog()?),
            dashboard_gate: AuthorizationGate::new(resolver, NavigationCatalog::dashboard()),
            allowed_origin: ORIGIN.to_owned(),
        };

        Ok(Self {
            state,
            users,
            hasher,
            emails,
            tenant_id: TenantId::new(),
            branch_id: BranchId::new(),
        })
    }

    async fn seed(&self, email: &str, role: Role) -> AppResult<Actor> {
        let record = self
            .users
            .create(NewUser {
                tenant_id: self.tenant_id,
                branch_id: (!role.is_global()).then_some(self.branch_id),
                email: EmailAddress::new(email)?,
                display_name: email.to_owned(),
                password_hash: self.hasher.hash_password(PASSWORD)?,
                role,
                permissions: PermissionSet::new(),
            })
            .await?;

        Ok(record.to_actor())
    }
}

fn new_session() -> Session {
    Session::new(None, Arc::new(MemoryStore::default()), None)
}

fn login_request(email: &str, password: &str) -> Json<LoginRequest> {
    Json(LoginRequest {
        email: email.to_owned(),
        password: password.to_owned(),
    })
}

#[tokio::test]
async fn login_stores_actor_and_me_reports_role_permissions() -> ApiResult<()> {
    let fixture = Fixture::new()?;
    fixture.seed("tecnico@engeserv.com.br", Role::User).await?;
    let session = new_session();

    let Json(logged_in) = login_handler(
        State(fixture.state.clone()),
        session.clone(),
        login_request("Tecnico@Engeserv.com.br", PASSWORD),
    )
    .await?;
    assert_eq!(logged_in.role, "user");

    let actor = TowerSessionStore::new(session)
        .get()
        .await?
        .ok_or_else(|| AppError::Internal("session should hold the actor".to_owned()))?;

    let Json(me) = me_handler(State(fixture.state.clone()), Extension(actor)).await;
    assert_eq!(me.subject, logged_in.subject);
    assert!(me.permissions.contains(&"view:dashboard".to_owned()));
    assert!(!me.permissions.contains(&"view:users".to_owned()));
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_unauthorized_and_leaves_no_session() -> ApiResult<()> {
    let fixture = Fixture::new()?;
    fixture.seed("tecnico@engeserv.com.br", Role::User).await?;
    let session = new_session();

    let result = login_handler(
        State(fixture.state.clone()),
        session.clone(),
        login_request("tecnico@engeserv.com.br", "senha-errada-123"),
    )
    .await;

    assert!(matches!(result, Err(ApiError(AppError::Unauthorized(_)))));
    assert_eq!(TowerSessionStore::new(session).get().await?, None);
    Ok(())
}

#[tokio::test]
async fn logout_clears_the_session() -> ApiResult<()> {
    let fixture = Fixture::new()?;
    fixture.seed("tecnico@engeserv.com.br", Role::User).await?;
    let session = new_session();

    login_handler(
        State(fixture.state.clone()),
        session.clone(),
        login_request("tecnico@engeserv.com.br", PASSWORD),
    )
    .await?;
    let status = logout_handler(State(fixture.state.clone()), session.clone()).await?;

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(TowerSessionStore::new(session).get().await?, None);
    Ok(())
}

#[tokio::test]
async fn navigation_lists_only_reachable_dashboard_pages() -> ApiResult<()> {
    let fixture = Fixture::new()?;
    let user = fixture.seed("tecnico@engeserv.com.br", Role::User).await?;
    let admin = fixture.seed("gerente@engeserv.com.br", Role::Admin).await?;

    let paths = |items: Vec<crate::dto::NavigationItemResponse>| {
        items.into_iter().map(|item| item.path).collect::<Vec<_>>()
    };

    let Json(user_items) = navigation_handler(State(fixture.state.clone()), Extension(user)).await;
    let user_paths = paths(user_items);
    assert!(user_paths.contains(&"/dashboard/clients".to_owned()));
    assert!(user_paths.contains(&"/dashboard/profile".to_owned()));
    assert!(!user_paths.contains(&"/dashboard/users".to_owned()));
    assert!(!user_paths.contains(&"/login".to_owned()));

    let Json(admin_items) =
        navigation_handler(State(fixture.state.clone()), Extension(admin)).await;
    let admin_paths = paths(admin_items);
    assert!(admin_paths.contains(&"/dashboard/users".to_owned()));
    assert!(!admin_paths.contains(&"/dashboard/companies".to_owned()));
    Ok(())
}

#[tokio::test]
async fn navigation_access_reflects_session_and_permissions() -> ApiResult<()> {
    let fixture = Fixture::new()?;
    fixture.seed("tecnico@engeserv.com.br", Role::User).await?;
    let session = new_session();

    let access = |path: &str| Query(NavigationAccessQuery {
        path: path.to_owned(),
    });

    let Json(anonymous) = navigation_access_handler(
        State(fixture.state.clone()),
        session.clone(),
        access("/dashboard/clients"),
    )
    .await?;
    assert_eq!(anonymous.decision, "redirect_to_login");

    let Json(login_page) = navigation_access_handler(
        State(fixture.state.clone()),
        session.clone(),
        access("/login"),
    )
    .await?;
    assert_eq!(login_page.decision, "allow");

    login_handler(
        State(fixture.state.clone()),
        session.clone(),
        login_request("tecnico@engeserv.com.br", PASSWORD),
    )
    .await?;

    let Json(users_page) = navigation_access_handler(
        State(fixture.state.clone()),
        session.clone(),
        access("/dashboard/users"),
    )
    .await?;
    assert_eq!(users_page.decision, "deny");
    assert_eq!(users_page.required_permission.as_deref(), Some("view:users"));

    let Json(clients_page) = navigation_access_handler(
        State(fixture.state.clone()),
        session,
        access("/dashboard/clients?page=2"),
    )
    .await?;
    assert_eq!(clients_page.decision, "allow");
    Ok(())
}

#[tokio::test]
async fn permission_check_denies_codes_not_held() -> ApiResult<()> {
    let fixture = Fixture::new()?;
    let admin = fixture.seed("gerente@engeserv.com.br", Role::Admin).await?;

    let check = |code: &str| Json(PermissionCheckRequest {
        code: code.to_owned(),
    });

    let Json(granted) = check_permission_handler(
        State(fixture.state.clone()),
        Extension(admin.clone()),
        check("invite:user"),
    )
    .await?;
    assert!(granted.granted);

    let Json(denied) = check_permission_handler(
        State(fixture.state.clone()),
        Extension(admin.clone()),
        check("manage:permissions"),
    )
    .await?;
    assert!(!denied.granted);

    let Json(unknown) = check_permission_handler(
        State(fixture.state.clone()),
        Extension(admin.clone()),
        check("invite"),
    )
    .await?;
    assert!(!unknown.granted);
    assert_eq!(unknown.code, "invite");

    let blank = check_permission_handler(
        State(fixture.state.clone()),
        Extension(admin),
        check("  "),
    )
    .await;
    assert!(matches!(blank, Err(ApiError(AppError::Validation(_)))));
    Ok(())
}

#[tokio::test]
async fn branch_access_is_scoped_unless_global() -> ApiResult<()> {
    let fixture = Fixture::new()?;
    let admin = fixture.seed("gerente@engeserv.com.br", Role::Admin).await?;
    let superadmin = fixture.seed("diretoria@engeserv.com.br", Role::Superadmin).await?;
    let own_branch = fixture.branch_id.as_uuid();
    let other_branch = Uuid::new_v4();

    let Json(own) = branch_access_handler(
        State(fixture.state.clone()),
        Extension(admin.clone()),
        Path(own_branch),
    )
    .await;
    let Json(other) = branch_access_handler(
        State(fixture.state.clone()),
        Extension(admin),
        Path(other_branch),
    )
    .await;
    let Json(global) = branch_access_handler(
        State(fixture.state.clone()),
        Extension(superadmin),
        Path(other_branch),
    )
    .await;

    assert!(own.granted);
    assert!(!other.granted);
    assert!(global.granted);
    Ok(())
}

#[tokio::test]
async fn invited_colleague_can_accept_and_log_in() -> ApiResult<()> {
    let fixture = Fixture::new()?;
    let admin = fixture.seed("gerente@engeserv.com.br", Role::Admin).await?;

    let (status, Json(created)) = create_invitation_handler(
        State(fixture.state.clone()),
        Extension(admin.clone()),
        Json(CreateInvitationRequest {
            email: "novo.tecnico@engeserv.com.br".to_owned(),
            role: Some("user".to_owned()),
            permissions: vec!["view:clients".to_owned()],
            branch_id: None,
            ttl_days: None,
        }),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created.status, "pendente");
    assert_eq!(created.branch_id, Some(fixture.branch_id.to_string()));

    let Json(listed) =
        list_invitations_handler(State(fixture.state.clone()), Extension(admin.clone())).await?;
    assert_eq!(listed.len(), 1);

    let token = fixture
        .emails
        .last_token()
        .await
        .ok_or_else(|| AppError::Internal("invitation email should carry a token".to_owned()))?;

    let (status, Json(account)) = accept_invitation_handler(
        State(fixture.state.clone()),
        Json(AcceptInvitationRequest {
            token,
            password: PASSWORD.to_owned(),
            display_name: Some("Novo Técnico".to_owned()),
        }),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(account.role, "user");

    let Json(session) = login_handler(
        State(fixture.state.clone()),
        new_session(),
        login_request("novo.tecnico@engeserv.com.br", PASSWORD),
    )
    .await?;
    assert_eq!(session.permissions, vec!["view:clients".to_owned()]);

    let invitation_id = Uuid::parse_str(&created.id)
        .map_err(|error| AppError::Internal(format!("invalid invitation id: {error}")))?;
    let revoke_accepted = revoke_invitation_handler(
        State(fixture.state.clone()),
        Extension(admin),
        Path(invitation_id),
    )
    .await;
    assert!(matches!(revoke_accepted, Err(ApiError(AppError::Conflict(_)))));
    Ok(())
}

#[tokio::test]
async fn plain_users_cannot_invite() -> ApiResult<()> {
    let fixture = Fixture::new()?;
    let user = fixture.seed("tecnico@engeserv.com.br", Role::User).await?;

    let result = create_invitation_handler(
        State(fixture.state.clone()),
        Extension(user),
        Json(CreateInvitationRequest {
            email: "colega@engeserv.com.br".to_owned(),
            role: Some("user".to_owned()),
            permissions: Vec::new(),
            branch_id: None,
            ttl_days: None,
        }),
    )
    .await;

    assert!(matches!(result, Err(ApiError(AppError::Forbidden(_)))));
    Ok(())
}

#[tokio::test]
async fn missing_invitation_email_is_a_validation_error() -> ApiResult<()> {
    let fixture = Fixture::new()?;
    let admin = fixture.seed("gerente@engeserv.com.br", Role::Admin).await?;

    let request = serde_json::from_str::<CreateInvitationRequest>(r#"{ "role": "user" }"#)
        .map_err(|error| AppError::Internal(format!("payload should parse: {error}")))?;
    let result =
        create_invitation_handler(State(fixture.state.clone()), Extension(admin), Json(request))
            .await;

    assert!(matches!(result, Err(ApiError(AppError::Validation(_)))));
    Ok(())
}


fn router(fixture: &Fixture) -> AppResult<Router> {
    build_router(
        fixture.state.clone(),
        ORIGIN,
        SessionManagerLayer::new(MemoryStore::default()).with_name("engeserv.sid"),
    )
}

fn request(
    method: Method,
    uri: &str,
    cookie: Option<&HeaderValue>,
    body: Option<String>,
) -> AppResult<Request<Body>> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::ORIGIN, ORIGIN);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }

    builder
        .body(body.map_or_else(Body::empty, Body::from))
        .map_err(|error| AppError::Internal(format!("invalid test request: {error}")))
}

async fn send(router: &Router, request: Request<Body>) -> AppResult<Response> {
    router
        .clone()
        .oneshot(request)
        .await
        .map_err(|error| match error {})
}

fn session_cookie(response: &Response) -> AppResult<HeaderValue> {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Internal("login should set a session cookie".to_owned()))?;
    let pair = set_cookie.split(';').next().unwrap_or_default();

    HeaderValue::from_str(pair)
        .map_err(|error| AppError::Internal(format!("invalid cookie: {error}")))
}

#[tokio::test]
async fn router_gate_requires_session_then_permission() -> AppResult<()> {
    let fixture = Fixture::new()?;
    fixture.seed("tecnico@engeserv.com.br", Role::User).await?;
    let router = router(&fixture)?;

    let health = send(&router, request(Method::GET, "/health", None, None)?).await?;
    assert_eq!(health.status(), StatusCode::OK);

    let anonymous = send(&router, request(Method::GET, "/auth/me", None, None)?).await?;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let login_body = format!(
        r#"{{ "email": "tecnico@engeserv.com.br", "password": "{PASSWORD}" }}"#
    );
    let login = send(
        &router,
        request(Method::POST, "/auth/login", None, Some(login_body))?,
    )
    .await?;
    assert_eq!(login.status(), StatusCode::OK);
    let cookie = session_cookie(&login)?;

    let me = send(&router, request(Method::GET, "/auth/me", Some(&cookie), None)?).await?;
    assert_eq!(me.status(), StatusCode::OK);

    let invitations = send(
        &router,
        request(Method::GET, "/api/invitations", Some(&cookie), None)?,
    )
    .await?;
    assert_eq!(invitations.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn router_rejects_mutations_from_other_origins() -> AppResult<()> {
    let fixture = Fixture::new()?;
    fixture.seed("tecnico@engeserv.com.br", Role::User).await?;
    let router = router(&fixture)?;

    let mut foreign = request(
        Method::POST,
        "/auth/login",
        None,
        Some(format!(
            r#"{{ "email": "tecnico@engeserv.com.br", "password": "{PASSWORD}" }}"#
        )),
    )?;
    foreign
        .headers_mut()
        .insert(header::ORIGIN, HeaderValue::from_static("https://evil.test"));

    let response = send(&router, foreign).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
