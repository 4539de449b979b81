//! Session lifecycle: credential verification, login and logout.
//!
//! Failures always surface the same message so callers cannot tell an
//! unknown email from a wrong password.

use std::sync::Arc;

use engeserv_core::{AppError, AppResult};
use engeserv_domain::{Actor, EmailAddress, SessionEvent, SessionState};
use tracing::{info, warn};

use crate::{PasswordHasher, SessionStore, UserRepository};

const INVALID_CREDENTIALS: &str = "invalid email or password";

/// Application service driving the session state machine.
#[derive(Clone)]
pub struct SessionService {
    user_repository: Arc<dyn UserRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
}

impl SessionService {
    /// Creates a new session service.
    #[must_use]
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            user_repository,
            password_hasher,
        }
    }

    /// Verifies credentials and persists the actor in the session.
    ///
    /// On failure the session is cleared and `Unauthorized` is returned.
    pub async fn login(
        &self,
        session: &dyn SessionStore,
        email: &str,
        password: &str,
    ) -> AppResult<Actor> {
        let state = self
            .current_state(session)
            .await?
            .apply(SessionEvent::CredentialsSubmitted)?;

        match self.verify_credentials(email, password).await? {
            Some(actor) => {
                let state = state.apply(SessionEvent::CredentialsAccepted(actor.clone()))?;
                session.set(&actor).await?;

                info!(
                    subject = actor.subject(),
                    tenant_id = %actor.tenant_id(),
                    state = state.name(),
                    "login succeeded"
                );
                Ok(actor)
            }
            None => {
                let state = state.apply(SessionEvent::CredentialsRejected)?;
                session.clear().await?;

                warn!(state = state.name(), "login failed");
                Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_owned()))
            }
        }
    }

    /// Clears the session subject.
    pub async fn logout(&self, session: &dyn SessionStore) -> AppResult<()> {
        if let Some(actor) = session.get().await? {
            info!(subject = actor.subject(), "logout");
        }

        session.clear().await
    }

    /// Returns the session state as seen by the next navigation.
    pub async fn current_state(&self, session: &dyn SessionStore) -> AppResult<SessionState> {
        Ok(match session.get().await? {
            Some(actor) => SessionState::Authenticated(actor),
            None => SessionState::Unauthenticated,
        })
    }

    async fn verify_credentials(&self, email: &str, password: &str) -> AppResult<Option<Actor>> {
        let user = match EmailAddress::new(email) {
            Ok(email) => self.user_repository.find_by_email(&email).await?,
            Err(_) => None,
        };

        let Some(user) = user else {
            let _ = self.password_hasher.hash_password(password);
            return Ok(None);
        };

        if !self
            .password_hasher
            .verify_password(password, &user.password_hash)?
        {
            return Ok(None);
        }

        Ok(Some(user.to_actor()))
    }
}
