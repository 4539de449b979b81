//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod actor;
mod invitation;
mod navigation;
mod permission;
mod role;
mod session;
mod user;

pub use actor::Actor;
pub use invitation::{
    INVITATION_MAX_TTL_DAYS, Invitation, InvitationDraft, InvitationId, InvitationStatus,
    StoredInvitation,
};
pub use navigation::{NavigationCatalog, NavigationUnit};
pub use permission::{PermissionCode, PermissionSet};
pub use role::{Role, RoleBaseTable};
pub use session::{SessionEvent, SessionState};
pub use user::{
    EmailAddress, PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH, UserId, validate_password,
};
