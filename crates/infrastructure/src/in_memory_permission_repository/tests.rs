use std::sync::Arc;

use ergon_application::{PermissionRepository, PermissionService};
use ergon_core::{AppError, OrganizationId, UserIdentity};
use ergon_domain::{
    AssignmentId, GrantScope, ModuleId, OrganizationUnit, OrganizationUnitId, Permission,
    PermissionAction, PermissionId, ResourceScope, Role, RoleId, RolePermission, SubmoduleId,
    UnitAssignment, User, UserId,
};

use super::InMemoryPermissionRepository;

struct Seed {
    repository: Arc<InMemoryPermissionRepository>,
    organization_id: OrganizationId,
    user_id: UserId,
    unit_id: OrganizationUnitId,
}

async fn seed() -> Seed {
    let repository = Arc::new(InMemoryPermissionRepository::new());
    let organization_id = OrganizationId::new();
    let user_id = UserId::new();
    let unit_id = OrganizationUnitId::new();

    let user = User::new(
        user_id,
        "clerk@example.com",
        "Clerk",
        Some(organization_id),
        true,
    )
    .unwrap_or_else(|_| unreachable!());
    let unit = OrganizationUnit::new(unit_id, organization_id, "Head Office", None, true)
        .unwrap_or_else(|_| unreachable!());

    assert!(repository.save_user(user).await.is_ok());
    assert!(repository.save_unit(unit).await.is_ok());

    Seed {
        repository,
        organization_id,
        user_id,
        unit_id,
    }
}

async fn add_role(seed: &Seed, name: &str, is_system_admin: bool, is_active: bool) -> RoleId {
    let role_id = RoleId::new();
    let role = Role::new(
        role_id,
        seed.organization_id,
        name,
        is_system_admin,
        is_active,
    )
    .unwrap_or_else(|_| unreachable!());
    assert!(seed.repository.save_role(role).await.is_ok());
    role_id
}

async fn add_permission(seed: &Seed, action: PermissionAction) -> PermissionId {
    let permission_id = PermissionId::new();
    let permission = Permission::new(permission_id, "hr", "attendance", action)
        .unwrap_or_else(|_| unreachable!());
    assert!(seed.repository.save_permission(permission).await.is_ok());
    permission_id
}

async fn grant(
    seed: &Seed,
    role_id: RoleId,
    permission_id: PermissionId,
    scope: GrantScope,
    granted: bool,
) {
    let entry = RolePermission::new(role_id, permission_id, scope, granted, false)
        .unwrap_or_else(|_| unreachable!());
    assert!(seed.repository.save_role_permission(entry).await.is_ok());
}

async fn assign(seed: &Seed, unit_id: OrganizationUnitId, role_id: RoleId, is_active: bool) {
    let assignment = UnitAssignment::new(
        AssignmentId::new(),
        seed.user_id,
        unit_id,
        role_id,
        is_active,
    );
    assert!(seed.repository.save_assignment(assignment).await.is_ok());
}

#[tokio::test]
async fn module_view_with_submodule_revocation_resolves_per_submodule() {
    let seed = seed().await;
    let role_id = add_role(&seed, "Attendance Clerk", false, true).await;
    let view = add_permission(&seed, PermissionAction::View).await;
    let module_id = ModuleId::new();
    let restricted = SubmoduleId::new();
    let open = SubmoduleId::new();
    grant(&seed, role_id, view, GrantScope::module(module_id), true).await;
    grant(
        &seed,
        role_id,
        view,
        GrantScope::submodule(module_id, restricted),
        false,
    )
    .await;
    assign(&seed, seed.unit_id, role_id, true).await;

    let service = PermissionService::new(seed.repository.clone());
    let identity = UserIdentity::from_user_id(seed.user_id.as_uuid());

    let restricted_view = service
        .has_action(
            &identity,
            ResourceScope::module(module_id).with_submodule(restricted),
            PermissionAction::View,
        )
        .await;
    let open_view = service
        .has_action(
            &identity,
            ResourceScope::module(module_id).with_submodule(open),
            PermissionAction::View,
        )
        .await;

    assert!(matches!(restricted_view, Ok(false)));
    assert!(matches!(open_view, Ok(true)));
}

#[tokio::test]
async fn inactive_unit_role_or_assignment_contributes_nothing() {
    let seed = seed().await;
    let closed_unit_id = OrganizationUnitId::new();
    let closed_unit = OrganizationUnit::new(
        closed_unit_id,
        seed.organization_id,
        "Closed Branch",
        Some(seed.unit_id),
        false,
    )
    .unwrap_or_else(|_| unreachable!());
    assert!(seed.repository.save_unit(closed_unit).await.is_ok());

    let admin_role = add_role(&seed, "System Admin", true, true).await;
    let retired_role = add_role(&seed, "Retired Admin", true, false).await;
    assign(&seed, closed_unit_id, admin_role, true).await;
    assign(&seed, seed.unit_id, retired_role, true).await;
    assign(&seed, seed.unit_id, admin_role, false).await;

    let assignments = seed
        .repository
        .list_active_assignments(seed.user_id)
        .await;
    assert!(matches!(assignments, Ok(values) if values.is_empty()));
}

#[tokio::test]
async fn scoped_grants_skip_other_modules() {
    let seed = seed().await;
    let role_id = add_role(&seed, "Clerk", false, true).await;
    let edit = add_permission(&seed, PermissionAction::Edit).await;
    let module_id = ModuleId::new();
    grant(&seed, role_id, edit, GrantScope::organization(), true).await;
    grant(&seed, role_id, edit, GrantScope::module(ModuleId::new()), false).await;

    let grants = seed
        .repository
        .list_scoped_grants(&[role_id], module_id)
        .await
        .unwrap_or_default();

    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0].scope, GrantScope::organization());
}

#[tokio::test]
async fn saving_same_role_permission_scope_replaces_outcome() {
    let seed = seed().await;
    let role_id = add_role(&seed, "Clerk", false, true).await;
    let view = add_permission(&seed, PermissionAction::View).await;
    let module_id = ModuleId::new();
    grant(&seed, role_id, view, GrantScope::module(module_id), true).await;
    grant(&seed, role_id, view, GrantScope::module(module_id), false).await;

    let grants = seed
        .repository
        .list_scoped_grants(&[role_id], module_id)
        .await
        .unwrap_or_default();

    assert_eq!(grants.len(), 1);
    assert!(!grants[0].granted);
}

#[tokio::test]
async fn assignment_across_organizations_is_rejected() {
    let seed = seed().await;
    let foreign_role = Role::new(RoleId::new(), OrganizationId::new(), "Foreign", false, true)
        .unwrap_or_else(|_| unreachable!());
    let foreign_role_id = foreign_role.id();
    assert!(seed.repository.save_role(foreign_role).await.is_ok());

    let result = seed
        .repository
        .save_assignment(UnitAssignment::new(
            AssignmentId::new(),
            seed.user_id,
            seed.unit_id,
            foreign_role_id,
            true,
        ))
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn duplicate_role_name_in_organization_is_conflict() {
    let seed = seed().await;
    add_role(&seed, "Approver", false, true).await;
    let duplicate = Role::new(RoleId::new(), seed.organization_id, "Approver", false, true)
        .unwrap_or_else(|_| unreachable!());

    let result = seed.repository.save_role(duplicate).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn unit_cycle_is_rejected() {
    let seed = seed().await;
    let child_id = OrganizationUnitId::new();
    let child = OrganizationUnit::new(
        child_id,
        seed.organization_id,
        "Payroll Desk",
        Some(seed.unit_id),
        true,
    )
    .unwrap_or_else(|_| unreachable!());
    assert!(seed.repository.save_unit(child).await.is_ok());

    let moved_root = OrganizationUnit::new(
        seed.unit_id,
        seed.organization_id,
        "Head Office",
        Some(child_id),
        true,
    )
    .unwrap_or_else(|_| unreachable!());

    let result = seed.repository.save_unit(moved_root).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
}
