//! Invitation lifecycle: issue, resend, revoke, accept and expiry sweep.
//!
//! Tokens are random, delivered only by email and persisted as SHA-256
//! digests. Issuing actors may never hand out more than they hold.

use std::sync::Arc;

use engeserv_core::{AppError, AppResult, BranchId};
use engeserv_domain::{Actor, Invitation, InvitationId, PermissionCode, Role};

use crate::{
    EmailService, InvitationRepository, PasswordHasher, PermissionResolver, UserRepository,
};

mod accept;
mod create;
mod lifecycle;
mod token_crypto;


/// Default invitation lifetime.
pub const DEFAULT_INVITATION_TTL_DAYS: u32 = 7;

const INVITE_PERMISSION: &str = "invite:user";
const VIEW_INVITATIONS_PERMISSION: &str = "view:invitations";

/// Runtime settings for invitation delivery.
#[derive(Debug, Clone)]
pub struct InvitationSettings {
    /// Dashboard base URL used to build acceptance links.
    pub frontend_url: String,
    /// Lifetime applied when the caller does not pick one.
    pub default_ttl_days: u32,
}

impl Default for InvitationSettings {
    fn default() -> Self {
        Self {
            frontend_url: "http://localhost:3000".to_owned(),
            default_ttl_days: DEFAULT_INVITATION_TTL_DAYS,
        }
    }
}

/// Input for issuing an invitation.
#[derive(Debug, Clone, Default)]
pub struct CreateInvitationInput {
    /// Invitee email address.
    pub email: String,
    /// Role granted on acceptance.
    pub role: Option<Role>,
    /// Permission codes granted on acceptance as explicit override.
    pub permissions: Vec<String>,
    /// Branch assignment. Scoped actors default to their own branch.
    pub branch_id: Option<BranchId>,
    /// Lifetime override in days.
    pub ttl_days: Option<u32>,
}

/// Input for redeeming an invitation token.
#[derive(Debug, Clone)]
pub struct AcceptInvitationInput {
    /// Raw token from the invitation link.
    pub token: String,
    /// Display name for the new account; falls back to the email local part.
    pub display_name: Option<String>,
    /// Plaintext password for the new account.
    pub password: String,
}

/// Application service for the invitation lifecycle.
#[derive(Clone)]
pub struct InvitationService {
    invitation_repository: Arc<dyn InvitationRepository>,
    user_repository: Arc<dyn UserRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    email_service: Arc<dyn EmailService>,
    resolver: PermissionResolver,
    settings: InvitationSettings,
}

impl InvitationService {
    /// Creates a new invitation service.
    #[must_use]
    pub fn new(
        invitation_repository: Arc<dyn InvitationRepository>,
        user_repository: Arc<dyn UserRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
        email_service: Arc<dyn EmailService>,
        resolver: PermissionResolver,
        settings: InvitationSettings,
    ) -> Self {
        Self {
            invitation_repository,
            user_repository,
            password_hasher,
            email_service,
            resolver,
            settings,
        }
    }

    /// Lists the invitations visible to the actor: the actor's company,
    /// narrowed to the actor's branch unless the actor is global.
    pub async fn list(&self, actor: &Actor) -> AppResult<Vec<Invitation>> {
        self.require(actor, VIEW_INVITATIONS_PERMISSION)?;

        if actor.role().is_global() {
            return self
                .invitation_repository
                .list_for_tenant(actor.tenant_id(), None)
                .await;
        }

        let Some(branch_id) = actor.branch_id() else {
            return Ok(Vec::new());
        };

        self.invitation_repository
            .list_for_tenant(actor.tenant_id(), Some(branch_id))
            .await
    }

    fn require(&self, actor: &Actor, code: &str) -> AppResult<()> {
        let code = PermissionCode::new(code)?;
        self.resolver.require_permission(actor, &code)
    }

    fn ttl_days(&self, requested: Option<u32>) -> u32 {
        requested.unwrap_or(self.settings.default_ttl_days)
    }

    fn acceptance_link(&self, raw_token: &str) -> String {
        format!(
            "{}/accept-invite?token={raw_token}",
            self.settings.frontend_url.trim_end_matches('/')
        )
    }

    /// Loads an invitation the actor manages. Invitations of other companies
    /// are reported as missing.
    async fn managed_invitation(
        &self,
        actor: &Actor,
        invitation_id: InvitationId,
    ) -> AppResult<Invitation> {
        let invitation = self
            .invitation_repository
            .find_by_id(invitation_id)
            .await?
            .filter(|invitation| invitation.tenant_id() == actor.tenant_id())
            .ok_or_else(|| {
                AppError::NotFound(format!("invitation '{invitation_id}' does not exist"))
            })?;

        let in_scope = match invitation.branch_id() {
            Some(branch_id) => self.resolver.is_in_branch(actor, branch_id),
            None => actor.role().is_global(),
        };

        if !in_scope {
            return Err(AppError::Forbidden(format!(
                "invitation '{invitation_id}' belongs to another branch"
            )));
        }

        Ok(invitation)
    }

    async fn send_invitation_email(&self, invitation: &Invitation, raw_token: &str) -> AppResult<()> {
        let link = self.acceptance_link(raw_token);
        let expires_on = invitation.expires_at().format("%d/%m/%Y");
        let role = invitation.role();

        let subject = "Você foi convidado para a Engeserv".to_owned();
        let text_body = format!(
            "Você foi convidado para acessar o painel da Engeserv com o perfil '{role}'.\n\n\
             Para aceitar o convite e criar sua senha, acesse:\n{link}\n\n\
             Este link expira em {expires_on}."
        );
        let html_body = format!(
            "<p>Você foi convidado para acessar o painel da Engeserv com o perfil \
             <strong>{role}</strong>.</p>\
             <p><a href=\"{link}\">Aceitar convite</a></p>\
             <p>Este link expira em {expires_on}.</p>"
        );

        self.email_service
            .send_email(
                invitation.email().as_str(),
                &subject,
                &text_body,
                Some(&html_body),
            )
            .await
    }
}
