//! Engeserv background worker: sweeps lapsed invitations.

#![forbid(unsafe_code)]

use std::env;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use engeserv_application::InvitationRepository;
use engeserv_core::{AppError, AppResult};
use engeserv_infrastructure::PostgresInvitationRepository;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
struct WorkerConfig {
    database_url: String,
    worker_id: String,
    poll_interval_seconds: u64,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = WorkerConfig::load()?;
    let pool = connect_pool(config.database_url.as_str()).await?;
    let invitation_repository: Arc<dyn InvitationRepository> =
        Arc::new(PostgresInvitationRepository::new(pool));

    info!(
        worker_id = %config.worker_id,
        poll_interval_seconds = config.poll_interval_seconds,
        "engeserv-worker started"
    );

    loop {
        match sweep_overdue_invitations(invitation_repository.as_ref()).await {
            Ok(0) => {}
            Ok(expired) => {
                info!(worker_id = %config.worker_id, expired, "expired overdue invitations");
            }
            Err(error) => {
                warn!(
                    worker_id = %config.worker_id,
                    error = %error,
                    "invitation expiry sweep failed"
                );
            }
        }

        tokio::time::sleep(Duration::from_secs(config.poll_interval_seconds)).await;
    }
}

async fn sweep_overdue_invitations(repository: &dyn InvitationRepository) -> AppResult<usize> {
    repository.expire_overdue(Utc::now()).await
}

async fn connect_pool(database_url: &str) -> AppResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))
}

impl WorkerConfig {
    fn load() -> AppResult<Self> {
        let database_url = required_env("DATABASE_URL")?;
        let worker_id = env::var("WORKER_ID")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| format!("worker-{}", std::process::id()));
        let poll_interval_seconds = parse_env_u64("WORKER_POLL_INTERVAL_SECONDS", 60)?;

        if poll_interval_seconds == 0 {
            return Err(AppError::Validation(
                "WORKER_POLL_INTERVAL_SECONDS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            database_url,
            worker_id,
            poll_interval_seconds,
        })
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> AppResult<String> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn parse_env_u64(name: &str, default: u64) -> AppResult<u64> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use engeserv_application::InvitationRepository;
    use engeserv_core::{AppResult, TenantId};
    use engeserv_domain::{EmailAddress, Invitation, InvitationDraft, PermissionSet, Role};
    use engeserv_infrastructure::InMemoryInvitationRepository;

    use super::sweep_overdue_invitations;

    #[tokio::test]
    async fn sweep_expires_only_lapsed_invitations() -> AppResult<()> {
        let repository = InMemoryInvitationRepository::new();
        let tenant_id = TenantId::new();

        for (email, issued_days_ago) in [
            ("atrasado@engeserv.com.br", 10),
            ("novo@engeserv.com.br", 0),
        ] {
            let invitation = Invitation::issue(
                InvitationDraft {
                    tenant_id,
                    branch_id: None,
                    email: EmailAddress::new(email)?,
                    role: Role::User,
                    permissions: PermissionSet::new(),
                    invited_by: "admin".to_owned(),
                },
                format!("hash-{email}"),
                Utc::now() - Duration::days(issued_days_ago),
                7,
            )?;
            repository.insert(&invitation).await?;
        }

        assert_eq!(sweep_overdue_invitations(&repository).await?, 1);
        assert_eq!(sweep_overdue_invitations(&repository).await?, 0);
        Ok(())
    }
}
