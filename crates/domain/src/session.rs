use engeserv_core::{AppError, AppResult};

use crate::Actor;

/// Session lifecycle state.
///
/// Logging out, or losing the session storage, returns to `Unauthenticated`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No subject in the session.
    Unauthenticated,
    /// Credentials submitted and being verified.
    Authenticating,
    /// Subject persisted in the session.
    Authenticated(Actor),
}

/// Input driving a [`SessionState`] transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The user submitted credentials.
    CredentialsSubmitted,
    /// The credentials were verified for this actor.
    CredentialsAccepted(Actor),
    /// The credentials were rejected.
    CredentialsRejected,
    /// The user logged out or the storage was cleared.
    LoggedOut,
}

impl SessionState {
    /// Applies an event, rejecting transitions the lifecycle does not define.
    pub fn apply(self, event: SessionEvent) -> AppResult<Self> {
        match (self, event) {
            (_, SessionEvent::LoggedOut) => Ok(Self::Unauthenticated),
            (
                Self::Unauthenticated | Self::Authenticated(_),
                SessionEvent::CredentialsSubmitted,
            ) => Ok(Self::Authenticating),
            (Self::Authenticating, SessionEvent::CredentialsAccepted(actor)) => {
                Ok(Self::Authenticated(actor))
            }
            (Self::Authenticating, SessionEvent::CredentialsRejected) => Ok(Self::Unauthenticated),
            (state, event) => Err(AppError::Internal(format!(
                "invalid session transition from {} on {event:?}",
                state.name()
            ))),
        }
    }

    /// Returns the authenticated actor, if any.
    #[must_use]
    pub fn actor(&self) -> Option<&Actor> {
        match self {
            Self::Authenticated(actor) => Some(actor),
            Self::Unauthenticated | Self::Authenticating => None,
        }
    }

    /// Returns a short state name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Authenticating => "authenticating",
            Self::Authenticated(_) => "authenticated",
        }
    }
}
