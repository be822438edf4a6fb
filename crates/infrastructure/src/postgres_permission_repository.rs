use std::str::FromStr;

use async_trait::async_trait;
use ergon_application::{ActiveAssignment, PermissionRepository};
use ergon_core::{AppError, AppResult, OrganizationId};
use ergon_domain::{
    AssignmentId, FormId, GrantScope, ModuleId, OrganizationUnitId, PermissionAction, RoleId,
    ScopedGrant, SubmoduleId, User, UserId, UserLookup,
};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

mod assignments;
mod grants;
mod users;

#[cfg(test)]
mod tests;

/// PostgreSQL-backed repository for permission resolution reads.
#[derive(Clone)]
pub struct PostgresPermissionRepository {
    pool: PgPool,
}

impl PostgresPermissionRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    display_name: String,
    organization_id: Option<Uuid>,
    is_active: bool,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        User::new(
            UserId::from_uuid(row.id),
            row.email,
            row.display_name,
            row.organization_id.map(OrganizationId::from_uuid),
            row.is_active,
        )
        .map_err(|error| AppError::Internal(format!("failed to decode user '{}': {error}", row.id)))
    }
}

#[derive(Debug, FromRow)]
struct ActiveAssignmentRow {
    assignment_id: Uuid,
    unit_id: Uuid,
    unit_name: String,
    role_id: Uuid,
    role_name: String,
    is_system_admin: bool,
}

impl From<ActiveAssignmentRow> for ActiveAssignment {
    fn from(row: ActiveAssignmentRow) -> Self {
        Self {
            assignment_id: AssignmentId::from_uuid(row.assignment_id),
            unit_id: OrganizationUnitId::from_uuid(row.unit_id),
            unit_name: row.unit_name,
            role_id: RoleId::from_uuid(row.role_id),
            role_name: row.role_name,
            is_system_admin: row.is_system_admin,
        }
    }
}

#[derive(Debug, FromRow)]
struct ScopedGrantRow {
    role_id: Uuid,
    action: String,
    module_id: Option<Uuid>,
    submodule_id: Option<Uuid>,
    form_id: Option<Uuid>,
    granted: bool,
}

impl TryFrom<ScopedGrantRow> for ScopedGrant {
    type Error = AppError;

    fn try_from(row: ScopedGrantRow) -> Result<Self, Self::Error> {
        let action = PermissionAction::from_str(row.action.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "failed to decode permission action '{}' for role '{}': {error}",
                row.action, row.role_id
            ))
        })?;
        let scope = GrantScope::new(
            row.module_id.map(ModuleId::from_uuid),
            row.submodule_id.map(SubmoduleId::from_uuid),
            row.form_id.map(FormId::from_uuid),
        )
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to decode grant scope for role '{}': {error}",
                row.role_id
            ))
        })?;

        Ok(Self {
            role_id: RoleId::from_uuid(row.role_id),
            action,
            scope,
            granted: row.granted,
        })
    }
}

#[async_trait]
impl PermissionRepository for PostgresPermissionRepository {
    async fn find_user(&self, lookup: &UserLookup) -> AppResult<Option<User>> {
        self.find_user_impl(lookup).await
    }

    async fn list_active_assignments(&self, user_id: UserId) -> AppResult<Vec<ActiveAssignment>> {
        self.list_active_assignments_impl(user_id).await
    }

    async fn list_scoped_grants(
        &self,
        role_ids: &[RoleId],
        module_id: ModuleId,
    ) -> AppResult<Vec<ScopedGrant>> {
        self.list_scoped_grants_impl(role_ids, module_id).await
    }
}
