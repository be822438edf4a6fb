use std::collections::HashMap;

use async_trait::async_trait;
use ergon_application::{ActiveAssignment, PermissionRepository};
use ergon_core::{AppError, AppResult};
use ergon_domain::{
    AssignmentId, ModuleId, OrganizationUnit, OrganizationUnitId, Permission, PermissionId, Role,
    RoleId, RolePermission, ScopedGrant, UnitAssignment, User, UserId, UserLookup,
    validate_unit_placement,
};
use tokio::sync::RwLock;

#[cfg(test)]
mod tests;

/// In-memory permission repository implementation.
///
/// Mirrors the PostgreSQL adapter's filtering rules and additionally exposes
/// seeding operations with the same referential checks the schema enforces.
#[derive(Debug, Default)]
pub struct InMemoryPermissionRepository {
    users: RwLock<HashMap<UserId, User>>,
    units: RwLock<HashMap<OrganizationUnitId, OrganizationUnit>>,
    roles: RwLock<HashMap<RoleId, Role>>,
    permissions: RwLock<HashMap<PermissionId, Permission>>,
    role_permissions: RwLock<Vec<RolePermission>>,
    assignments: RwLock<HashMap<AssignmentId, UnitAssignment>>,
}

impl InMemoryPermissionRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a user. Emails stay unique across users.
    pub async fn save_user(&self, user: User) -> AppResult<()> {
        let mut users = self.users.write().await;

        if users
            .values()
            .any(|existing| existing.email() == user.email() && existing.id() != user.id())
        {
            return Err(AppError::Conflict(format!(
                "email '{}' is already used by another user",
                user.email().as_str()
            )));
        }

        users.insert(user.id(), user);
        Ok(())
    }

    /// Inserts or replaces an organization unit, keeping the hierarchy a tree.
    pub async fn save_unit(&self, unit: OrganizationUnit) -> AppResult<()> {
        let mut units = self.units.write().await;
        validate_unit_placement(&units, &unit)?;
        units.insert(unit.id(), unit);
        Ok(())
    }

    /// Inserts or replaces a role. Role names stay unique per organization.
    pub async fn save_role(&self, role: Role) -> AppResult<()> {
        let mut roles = self.roles.write().await;

        if roles.values().any(|existing| {
            existing.organization_id() == role.organization_id()
                && existing.name() == role.name()
                && existing.id() != role.id()
        }) {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists for organization '{}'",
                role.name(),
                role.organization_id()
            )));
        }

        roles.insert(role.id(), role);
        Ok(())
    }

    /// Inserts or replaces a permission.
    pub async fn save_permission(&self, permission: Permission) -> AppResult<()> {
        self.permissions
            .write()
            .await
            .insert(permission.id(), permission);
        Ok(())
    }

    /// Upserts a role permission keyed by role, permission and scope.
    pub async fn save_role_permission(&self, role_permission: RolePermission) -> AppResult<()> {
        if !self
            .roles
            .read()
            .await
            .contains_key(&role_permission.role_id())
        {
            return Err(AppError::NotFound(format!(
                "role '{}' does not exist",
                role_permission.role_id()
            )));
        }

        if !self
            .permissions
            .read()
            .await
            .contains_key(&role_permission.permission_id())
        {
            return Err(AppError::NotFound(format!(
                "permission '{}' does not exist",
                role_permission.permission_id()
            )));
        }

        let mut role_permissions = self.role_permissions.write().await;
        role_permissions.retain(|existing| {
            !(existing.role_id() == role_permission.role_id()
                && existing.permission_id() == role_permission.permission_id()
                && existing.scope() == role_permission.scope())
        });
        role_permissions.push(role_permission);
        Ok(())
    }

    /// Inserts or replaces an assignment after checking its references.
    ///
    /// The unit and role must belong to the user's organization.
    pub async fn save_assignment(&self, assignment: UnitAssignment) -> AppResult<()> {
        let organization_id = self
            .users
            .read()
            .await
            .get(&assignment.user_id())
            .ok_or_else(|| {
                AppError::NotFound(format!("user '{}' does not exist", assignment.user_id()))
            })?
            .organization_id()
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "user '{}' does not belong to an organization",
                    assignment.user_id()
                ))
            })?;

        let unit_organization_id = self
            .units
            .read()
            .await
            .get(&assignment.unit_id())
            .map(OrganizationUnit::organization_id)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "organization unit '{}' does not exist",
                    assignment.unit_id()
                ))
            })?;

        let role_organization_id = self
            .roles
            .read()
            .await
            .get(&assignment.role_id())
            .map(Role::organization_id)
            .ok_or_else(|| {
                AppError::NotFound(format!("role '{}' does not exist", assignment.role_id()))
            })?;

        if unit_organization_id != organization_id || role_organization_id != organization_id {
            return Err(AppError::Validation(format!(
                "assignment '{}' crosses organization boundaries",
                assignment.id()
            )));
        }

        self.assignments
            .write()
            .await
            .insert(assignment.id(), assignment);
        Ok(())
    }
}

#[async_trait]
impl PermissionRepository for InMemoryPermissionRepository {
    async fn find_user(&self, lookup: &UserLookup) -> AppResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.matches(lookup))
            .cloned())
    }

    async fn list_active_assignments(&self, user_id: UserId) -> AppResult<Vec<ActiveAssignment>> {
        let assignments = self.assignments.read().await;
        let roles = self.roles.read().await;
        let units = self.units.read().await;

        let mut values: Vec<ActiveAssignment> = assignments
            .values()
            .filter(|assignment| assignment.user_id() == user_id && assignment.is_active())
            .filter_map(|assignment| {
                let role = roles.get(&assignment.role_id()).filter(|role| role.is_active())?;
                let unit = units.get(&assignment.unit_id()).filter(|unit| unit.is_active())?;

                Some(ActiveAssignment {
                    assignment_id: assignment.id(),
                    unit_id: unit.id(),
                    unit_name: unit.name().as_str().to_owned(),
                    role_id: role.id(),
                    role_name: role.name().as_str().to_owned(),
                    is_system_admin: role.is_system_admin(),
                })
            })
            .collect();

        values.sort_by(|left, right| {
            left.unit_name
                .cmp(&right.unit_name)
                .then_with(|| left.role_name.cmp(&right.role_name))
        });

        Ok(values)
    }

    async fn list_scoped_grants(
        &self,
        role_ids: &[RoleId],
        module_id: ModuleId,
    ) -> AppResult<Vec<ScopedGrant>> {
        let role_permissions = self.role_permissions.read().await;
        let permissions = self.permissions.read().await;

        role_permissions
            .iter()
            .filter(|entry| role_ids.contains(&entry.role_id()))
            .filter(|entry| {
                entry
                    .scope()
                    .module_id()
                    .is_none_or(|value| value == module_id)
            })
            .map(|entry| {
                permissions
                    .get(&entry.permission_id())
                    .map(|permission| entry.to_scoped_grant(permission.action()))
                    .ok_or_else(|| {
                        AppError::Internal(format!(
                            "role permission references missing permission '{}'",
                            entry.permission_id()
                        ))
                    })
            })
            .collect()
    }
}
