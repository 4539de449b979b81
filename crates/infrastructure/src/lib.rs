//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod argon2_password_hasher;
mod console_email_service;
mod in_memory_invitation_repository;
mod in_memory_user_repository;
mod postgres_company_repository;
mod postgres_invitation_repository;
mod postgres_user_repository;
mod smtp_email_service;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use console_email_service::ConsoleEmailService;
pub use in_memory_invitation_repository::InMemoryInvitationRepository;
pub use in_memory_user_repository::InMemoryUserRepository;
pub use postgres_company_repository::PostgresCompanyRepository;
pub use postgres_invitation_repository::PostgresInvitationRepository;
pub use postgres_user_repository::PostgresUserRepository;
pub use smtp_email_service::{SmtpEmailConfig, SmtpEmailService};

use engeserv_core::AppError;

/// Maps a unique-constraint violation to `Conflict`, anything else to `Internal`.
fn conflict_or_internal(error: sqlx::Error, operation: &str, conflict: &str) -> AppError {
    if let sqlx::Error::Database(ref database_error) = error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict(conflict.to_owned());
    }

    AppError::Internal(format!("failed to {operation}: {error}"))
}
