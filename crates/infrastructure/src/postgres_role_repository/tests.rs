use std::sync::Arc;

use campusguard_application::{
    AuthorizationService, RoleRepository, RoleService, UserRoleAssignment, UserRoleRepository,
};
use campusguard_core::{AccountId, AppError, UserIdentity};
use campusguard_domain::{
    AuditAction, DefaultRole, Permission, PermissionKey, PermissionMap, Role, RoleId, RolePatch,
};
use chrono::Utc;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::PostgresRoleRepository;
use crate::{InMemoryAuditRepository, PostgresUserRoleRepository};

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
        panic!("failed to run migrations for postgres role tests: {error}");
    }

    Some(pool)
}

fn unique_account() -> AccountId {
    AccountId::new(format!("acct-{}", Uuid::new_v4())).unwrap_or_else(|_| unreachable!())
}

fn defaults(account_id: &AccountId) -> Vec<Role> {
    DefaultRole::all()
        .iter()
        .map(|role| Role::from_default(*role, account_id.clone(), Utc::now()))
        .collect()
}

#[tokio::test]
async fn seeding_twice_keeps_six_roles_and_edits() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRoleRepository::new(pool);
    let account_id = unique_account();

    let first = repository
        .seed_roles(&account_id, defaults(&account_id))
        .await
        .unwrap_or_default();
    assert_eq!(first.inserted.len(), 6);

    let admin_id = RoleId::from(DefaultRole::Admin);
    let mut admin = repository
        .find_role(&account_id, &admin_id)
        .await
        .unwrap_or_default()
        .unwrap_or_else(|| unreachable!());
    let patched = admin.apply_patch(
        RolePatch {
            description: Some("District administrators".to_owned()),
            ..RolePatch::default()
        },
        Utc::now(),
    );
    assert!(patched.is_ok());
    assert!(repository.save_role(admin).await.is_ok());

    let second = repository
        .seed_roles(&account_id, defaults(&account_id))
        .await
        .unwrap_or_default();
    assert!(second.is_noop());

    let roles = repository.list_roles(&account_id).await.unwrap_or_default();
    assert_eq!(roles.len(), 6);
    let admin = roles
        .iter()
        .find(|role| role.role_id() == &admin_id)
        .unwrap_or_else(|| unreachable!());
    assert_eq!(admin.description(), "District administrators");
    assert_eq!(
        admin
            .permissions()
            .get(&PermissionKey::Known(Permission::AdminRolesManage)),
        Some(true)
    );
}

#[tokio::test]
async fn unknown_permission_keys_survive_round_trip() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRoleRepository::new(pool);
    let account_id = unique_account();
    let role = Role::new(
        RoleId::generate(),
        account_id.clone(),
        "Custodian",
        "",
        PermissionMap::new()
            .with(Permission::ResourcesViewAll, true)
            .with("legacy.keys.manage", true),
        false,
        Utc::now(),
    )
    .unwrap_or_else(|_| unreachable!());
    assert!(repository.insert_role(role.clone()).await.is_ok());

    let stored = repository
        .find_role(&account_id, role.role_id())
        .await
        .unwrap_or_default()
        .unwrap_or_else(|| unreachable!());
    assert_eq!(stored.permissions(), role.permissions());
}

#[tokio::test]
async fn duplicate_names_conflict() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRoleRepository::new(pool);
    let account_id = unique_account();
    let custodian = |name: &str| {
        Role::new(
            RoleId::generate(),
            account_id.clone(),
            name,
            "",
            PermissionMap::new(),
            false,
            Utc::now(),
        )
        .unwrap_or_else(|_| unreachable!())
    };

    assert!(repository.insert_role(custodian("Custodian")).await.is_ok());
    let duplicate = repository.insert_role(custodian("custodian")).await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn deleting_role_cascades_to_assignments() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let roles = PostgresRoleRepository::new(pool.clone());
    let assignments = PostgresUserRoleRepository::new(pool);
    let account_id = unique_account();
    let role = Role::new(
        RoleId::generate(),
        account_id.clone(),
        "Night Guard",
        "",
        PermissionMap::new(),
        false,
        Utc::now(),
    )
    .unwrap_or_else(|_| unreachable!());
    assert!(roles.insert_role(role.clone()).await.is_ok());
    let assigned = assignments
        .assign(UserRoleAssignment {
            account_id: account_id.clone(),
            subject: "bob".to_owned(),
            role_id: role.role_id().clone(),
            assigned_at: Utc::now(),
        })
        .await;
    assert!(assigned.is_ok());

    assert!(roles.delete_role(&account_id, role.role_id()).await.is_ok());
    assert!(matches!(
        assignments.find_assignment(&account_id, "bob").await,
        Ok(None)
    ));

    let dangling = assignments
        .assign(UserRoleAssignment {
            account_id: account_id.clone(),
            subject: "bob".to_owned(),
            role_id: role.role_id().clone(),
            assigned_at: Utc::now(),
        })
        .await;
    assert!(matches!(dangling, Err(AppError::NotFound(_))));
}

fn assignment(account_id: &AccountId, subject: &str, role_id: RoleId) -> UserRoleAssignment {
    UserRoleAssignment {
        account_id: account_id.clone(),
        subject: subject.to_owned(),
        role_id,
        assigned_at: Utc::now(),
    }
}

#[tokio::test]
async fn first_assignment_is_claimed_once_per_account() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let roles = PostgresRoleRepository::new(pool.clone());
    let assignments = PostgresUserRoleRepository::new(pool);
    let account_id = unique_account();
    assert!(roles.seed_roles(&account_id, defaults(&account_id)).await.is_ok());

    let first = assignments
        .claim_first_assignment(assignment(&account_id, "alice", DefaultRole::SuperAdmin.into()))
        .await;
    assert!(matches!(first, Ok(true)));

    let second = assignments
        .claim_first_assignment(assignment(&account_id, "dana", DefaultRole::SuperAdmin.into()))
        .await;
    assert!(matches!(second, Ok(false)));
    assert!(matches!(
        assignments.find_assignment(&account_id, "dana").await,
        Ok(None)
    ));

    let unseeded = unique_account();
    let missing_role = assignments
        .claim_first_assignment(assignment(&unseeded, "erin", DefaultRole::SuperAdmin.into()))
        .await;
    assert!(matches!(missing_role, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn deleting_role_reports_released_assignments() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let roles = Arc::new(PostgresRoleRepository::new(pool.clone()));
    let assignments = Arc::new(PostgresUserRoleRepository::new(pool));
    let audit = Arc::new(InMemoryAuditRepository::new());
    let service = RoleService::new(
        AuthorizationService::new(roles.clone(), assignments.clone()),
        roles.clone(),
        assignments.clone(),
        audit.clone(),
    );
    let account_id = unique_account();
    assert!(roles.seed_roles(&account_id, defaults(&account_id)).await.is_ok());
    assert!(
        assignments
            .assign(assignment(&account_id, "alice", DefaultRole::SuperAdmin.into()))
            .await
            .is_ok()
    );

    let night_guard = Role::new(
        RoleId::generate(),
        account_id.clone(),
        "Night Guard",
        "",
        PermissionMap::new(),
        false,
        Utc::now(),
    )
    .unwrap_or_else(|_| unreachable!());
    assert!(roles.insert_role(night_guard.clone()).await.is_ok());
    for subject in ["bob", "carol"] {
        assert!(
            assignments
                .assign(assignment(&account_id, subject, night_guard.role_id().clone()))
                .await
                .is_ok()
        );
    }

    let alice = UserIdentity::new("alice", "alice", None, account_id.clone());
    assert!(service.delete_role(&alice, night_guard.role_id()).await.is_ok());

    let detail = audit
        .events_for(&account_id)
        .await
        .into_iter()
        .find(|event| event.action == AuditAction::SecurityRoleDeleted)
        .and_then(|event| event.detail);
    assert_eq!(
        detail.as_deref(),
        Some("deleted role 'Night Guard' and released 2 assignment(s)")
    );
}

#[tokio::test]
async fn seeding_skips_default_whose_name_is_taken() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRoleRepository::new(pool);
    let account_id = unique_account();
    let visitors = Role::new(
        RoleId::generate(),
        account_id.clone(),
        "GUEST",
        "",
        PermissionMap::new(),
        false,
        Utc::now(),
    )
    .unwrap_or_else(|_| unreachable!());
    assert!(repository.insert_role(visitors.clone()).await.is_ok());

    let outcome = repository
        .seed_roles(&account_id, defaults(&account_id))
        .await
        .unwrap_or_default();

    assert_eq!(outcome.inserted.len(), 5);
    assert_eq!(outcome.skipped, vec![RoleId::from(DefaultRole::Guest)]);
    let stored = repository
        .find_role(&account_id, visitors.role_id())
        .await
        .unwrap_or_default()
        .unwrap_or_else(|| unreachable!());
    assert!(!stored.is_system());
}
