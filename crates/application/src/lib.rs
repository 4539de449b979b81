//! Application services and ports.

#![forbid(unsafe_code)]

mod authorization_gate;
mod bootstrap_service;
mod invitation_ports;
mod invitation_service;
mod permission_resolver;
mod session_ports;
mod session_service;
mod user_ports;

pub use authorization_gate::{AuthorizationGate, GateDecision};
pub use bootstrap_service::{
    BootstrapOutcome, BootstrapRequest, BootstrapService, CompanyRepository,
};
pub use invitation_ports::{EmailService, InvitationRepository};
pub use invitation_service::{
    AcceptInvitationInput, CreateInvitationInput, DEFAULT_INVITATION_TTL_DAYS, InvitationService,
    InvitationSettings,
};
pub use permission_resolver::PermissionResolver;
pub use session_ports::SessionStore;
pub use session_service::SessionService;
pub use user_ports::{NewUser, PasswordHasher, UserRecord, UserRepository};
