use async_trait::async_trait;
use engeserv_application::SessionStore;
use engeserv_core::{AppError, AppResult};
use engeserv_domain::Actor;
use tower_sessions::Session;

/// Session key holding the authenticated actor.
pub const SESSION_ACTOR_KEY: &str = "actor";

/// [`SessionStore`] over the request's tower-sessions session.
///
/// Storing an actor cycles the session id first so a pre-login id never
/// carries an authenticated subject.
#[derive(Clone)]
pub struct TowerSessionStore {
    session: Session,
}

impl TowerSessionStore {
    pub fn new(session: Session) -> Self {
        Self { session }
    }
}

#[async_trait]
impl SessionStore for TowerSessionStore {
    async fn get(&self) -> AppResult<Option<Actor>> {
        self.session
            .get::<Actor>(SESSION_ACTOR_KEY)
            .await
            .map_err(|error| AppError::Internal(format!("failed to read session actor: {error}")))
    }

    async fn set(&self, actor: &Actor) -> AppResult<()> {
        self.session
            .cycle_id()
            .await
            .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;

        self.session
            .insert(SESSION_ACTOR_KEY, actor)
            .await
            .map_err(|error| AppError::Internal(format!("failed to persist session actor: {error}")))
    }

    async fn clear(&self) -> AppResult<()> {
        self.session
            .flush()
            .await
            .map_err(|error| AppError::Internal(format!("failed to clear session: {error}")))
    }
}
