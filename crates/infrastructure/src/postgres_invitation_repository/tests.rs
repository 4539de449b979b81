use chrono::{Duration, Utc};
use engeserv_application::InvitationRepository;
use engeserv_core::{AppError, TenantId};
use engeserv_domain::{
    EmailAddress, Invitation, InvitationDraft, InvitationStatus, PermissionSet, Role,
};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use super::PostgresInvitationRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres invitation tests: {error}");
    }

    Some(pool)
}

async fn ensure_company(pool: &PgPool, tenant_id: TenantId) {
    let insert = sqlx::query("INSERT INTO companies (id, name) VALUES ($1, $2)")
        .bind(tenant_id.as_uuid())
        .bind(format!("Empresa {tenant_id}"))
        .execute(pool)
        .await;

    assert!(insert.is_ok());
}

fn invitation(tenant_id: TenantId, email: &str, ttl_days: u32, issued_days_ago: i64) -> Invitation {
    Invitation::issue(
        InvitationDraft {
            tenant_id,
            branch_id: None,
            email: EmailAddress::new(email)
                .unwrap_or_else(|error| panic!("invalid test email: {error}")),
            role: Role::User,
            permissions: PermissionSet::parse(["view:clients"])
                .unwrap_or_else(|error| panic!("invalid test permissions: {error}")),
            invited_by: "admin-subject".to_owned(),
        },
        format!("hash-{}", uuid::Uuid::new_v4()),
        Utc::now() - Duration::days(issued_days_ago),
        ttl_days,
    )
    .unwrap_or_else(|error| panic!("failed to issue test invitation: {error}"))
}

#[tokio::test]
async fn invitation_lifecycle_persists_status_changes() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresInvitationRepository::new(pool.clone());
    let tenant_id = TenantId::new();
    ensure_company(&pool, tenant_id).await;

    let mut pending = invitation(tenant_id, "pendente@engeserv.com.br", 7, 0);
    assert!(repository.insert(&pending).await.is_ok());

    let duplicate = repository
        .insert(&invitation(tenant_id, "pendente@engeserv.com.br", 7, 0))
        .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    let by_token = repository.find_by_token_hash(pending.token_hash()).await;
    assert!(matches!(by_token, Ok(Some(ref found)) if found.id() == pending.id()));

    assert!(matches!(pending.revoke(), Ok(true)));
    assert!(repository.update(&pending).await.is_ok());

    let stored = repository.find_by_id(pending.id()).await;
    assert!(matches!(
        stored,
        Ok(Some(ref found)) if found.status() == InvitationStatus::Expired
    ));
}

#[tokio::test]
async fn expire_overdue_only_touches_lapsed_pending_rows() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresInvitationRepository::new(pool.clone());
    let tenant_id = TenantId::new();
    ensure_company(&pool, tenant_id).await;

    let overdue = invitation(tenant_id, "atrasado@engeserv.com.br", 1, 3);
    let current = invitation(tenant_id, "em.dia@engeserv.com.br", 7, 0);
    assert!(repository.insert(&overdue).await.is_ok());
    assert!(repository.insert(&current).await.is_ok());

    let expired = repository.expire_overdue(Utc::now()).await;
    assert!(matches!(expired, Ok(count) if count >= 1));

    let listed = repository
        .list_for_tenant(tenant_id, None)
        .await
        .unwrap_or_default();
    let status_of = |id| {
        listed
            .iter()
            .find(|invitation| invitation.id() == id)
            .map(Invitation::status)
    };

    assert_eq!(status_of(overdue.id()), Some(InvitationStatus::Expired));
    assert_eq!(status_of(current.id()), Some(InvitationStatus::Pending));
}
