use async_trait::async_trait;

use engeserv_core::AppResult;
use engeserv_domain::Actor;

/// Per-request session storage capability.
///
/// Implementations are bound to one client session; the gate and the
/// session service never see other sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Loads the persisted actor, if the session is authenticated.
    async fn get(&self) -> AppResult<Option<Actor>>;

    /// Persists the actor as the session subject.
    async fn set(&self, actor: &Actor) -> AppResult<()>;

    /// Removes every session value.
    async fn clear(&self) -> AppResult<()>;
}
