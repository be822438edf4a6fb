use ergon_application::PermissionRepository;
use ergon_core::OrganizationId;
use ergon_domain::{
    EmailAddress, GrantScope, ModuleId, PermissionAction, RoleId, SubmoduleId, UserId, UserLookup,
};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::PostgresPermissionRepository;

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
        panic!("failed to run migrations for postgres permission tests: {error}");
    }

    Some(pool)
}

struct Fixture {
    organization_id: OrganizationId,
    user_id: UserId,
    email: String,
    unit_id: Uuid,
    module_id: ModuleId,
}

type FixtureStatement<'q> = sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>;

async fn execute(pool: &PgPool, statement: FixtureStatement<'_>) {
    let result = statement.execute(pool).await;
    assert!(result.is_ok(), "fixture statement failed: {result:?}");
}

async fn seed_fixture(pool: &PgPool) -> Fixture {
    let organization_id = OrganizationId::new();
    let user_id = UserId::new();
    let email = format!("clerk-{}@example.com", Uuid::new_v4().simple());
    let unit_id = Uuid::new_v4();
    let module_id = ModuleId::new();

    execute(
        pool,
        sqlx::query("INSERT INTO organizations (id, name) VALUES ($1, 'Acme Manufacturing')")
            .bind(organization_id.as_uuid()),
    )
    .await;
    execute(
        pool,
        sqlx::query(
            r#"
            INSERT INTO users (id, email, display_name, organization_id, is_active)
            VALUES ($1, $2, 'Payroll Clerk', $3, TRUE)
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(email.clone())
        .bind(organization_id.as_uuid()),
    )
    .await;
    execute(
        pool,
        sqlx::query(
            "INSERT INTO organization_units (id, organization_id, name) VALUES ($1, $2, 'Head Office')",
        )
        .bind(unit_id)
        .bind(organization_id.as_uuid()),
    )
    .await;
    execute(
        pool,
        sqlx::query("INSERT INTO modules (id, organization_id, name) VALUES ($1, $2, 'HR')")
            .bind(module_id.as_uuid())
            .bind(organization_id.as_uuid()),
    )
    .await;

    Fixture {
        organization_id,
        user_id,
        email,
        unit_id,
        module_id,
    }
}

async fn insert_role(
    pool: &PgPool,
    fixture: &Fixture,
    name: &str,
    is_system_admin: bool,
    is_active: bool,
) -> RoleId {
    let role_id = RoleId::new();
    execute(
        pool,
        sqlx::query(
            r#"
            INSERT INTO roles (id, organization_id, name, is_system_admin, is_active)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(role_id.as_uuid())
        .bind(fixture.organization_id.as_uuid())
        .bind(name.to_owned())
        .bind(is_system_admin)
        .bind(is_active),
    )
    .await;
    role_id
}

async fn assign(pool: &PgPool, fixture: &Fixture, role_id: RoleId) {
    execute(
        pool,
        sqlx::query(
            "INSERT INTO user_unit_assignments (id, user_id, unit_id, role_id) VALUES ($1, $2, $3, $4)",
        )
        .bind(Uuid::new_v4())
        .bind(fixture.user_id.as_uuid())
        .bind(fixture.unit_id)
        .bind(role_id.as_uuid()),
    )
    .await;
}

async fn insert_permission(pool: &PgPool, action: PermissionAction) -> Uuid {
    let permission_id = Uuid::new_v4();
    execute(
        pool,
        sqlx::query(
            "INSERT INTO permissions (id, category, resource, action) VALUES ($1, 'hr', $2, $3)",
        )
        .bind(permission_id)
        .bind(format!("resource-{}", permission_id.simple()))
        .bind(action.as_str()),
    )
    .await;
    permission_id
}

#[tokio::test]
async fn finds_user_by_id_and_email() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let fixture = seed_fixture(&pool).await;
    let repository = PostgresPermissionRepository::new(pool);

    let by_id = repository
        .find_user(&UserLookup::Id(fixture.user_id))
        .await;
    assert!(matches!(&by_id, Ok(Some(user)) if user.id() == fixture.user_id));

    let email = EmailAddress::new(fixture.email.to_uppercase()).unwrap_or_else(|_| unreachable!());
    let by_email = repository.find_user(&UserLookup::Email(email)).await;
    assert!(matches!(&by_email, Ok(Some(user)) if user.id() == fixture.user_id));

    let missing = repository.find_user(&UserLookup::Id(UserId::new())).await;
    assert!(matches!(missing, Ok(None)));
}

#[tokio::test]
async fn inactive_roles_are_excluded_from_assignments() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let fixture = seed_fixture(&pool).await;
    let active_role = insert_role(&pool, &fixture, "Clerk", false, true).await;
    let retired_role = insert_role(&pool, &fixture, "Retired", true, false).await;
    assign(&pool, &fixture, active_role).await;
    assign(&pool, &fixture, retired_role).await;
    let repository = PostgresPermissionRepository::new(pool);

    let assignments = repository
        .list_active_assignments(fixture.user_id)
        .await
        .unwrap_or_default();

    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0].role_id, active_role);
    assert_eq!(assignments[0].unit_name, "Head Office");
    assert!(!assignments[0].is_system_admin);
}

#[tokio::test]
async fn scoped_grants_include_org_wide_and_module_entries_only() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let fixture = seed_fixture(&pool).await;
    let role_id = insert_role(&pool, &fixture, "Clerk", false, true).await;
    let view = insert_permission(&pool, PermissionAction::View).await;
    let edit = insert_permission(&pool, PermissionAction::Edit).await;
    let submodule_id = SubmoduleId::new();
    let other_module = ModuleId::new();

    execute(
        &pool,
        sqlx::query("INSERT INTO modules (id, name) VALUES ($1, 'Inventory')")
            .bind(other_module.as_uuid()),
    )
    .await;
    execute(
        &pool,
        sqlx::query("INSERT INTO submodules (id, module_id, name) VALUES ($1, $2, 'Payroll')")
            .bind(submodule_id.as_uuid())
            .bind(fixture.module_id.as_uuid()),
    )
    .await;

    for (permission_id, module_id, submodule_id, granted) in [
        (view, Some(fixture.module_id), None, true),
        (view, Some(fixture.module_id), Some(submodule_id), false),
        (edit, None, None, true),
        (edit, Some(other_module), None, true),
    ] {
        execute(
            &pool,
            sqlx::query(
                r#"
                INSERT INTO role_permissions (id, role_id, permission_id, module_id, submodule_id, granted)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(role_id.as_uuid())
            .bind(permission_id)
            .bind(module_id.map(|value| value.as_uuid()))
            .bind(submodule_id.map(|value| value.as_uuid()))
            .bind(granted),
        )
        .await;
    }

    let repository = PostgresPermissionRepository::new(pool);
    let grants = repository
        .list_scoped_grants(&[role_id], fixture.module_id)
        .await
        .unwrap_or_default();

    assert_eq!(grants.len(), 3);
    assert!(grants.iter().any(|grant| {
        grant.action == PermissionAction::View
            && grant.scope == GrantScope::submodule(fixture.module_id, submodule_id)
            && !grant.granted
    }));
    assert!(grants.iter().any(|grant| {
        grant.action == PermissionAction::Edit && grant.scope == GrantScope::organization()
    }));
    assert!(
        grants
            .iter()
            .all(|grant| grant.scope.module_id() != Some(other_module))
    );
}

#[tokio::test]
async fn scoped_grants_for_no_roles_is_empty() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresPermissionRepository::new(pool);

    let grants = repository.list_scoped_grants(&[], ModuleId::new()).await;
    assert!(matches!(grants, Ok(values) if values.is_empty()));
}
