use async_trait::async_trait;
use ergon_core::AppResult;
use ergon_domain::{
    AssignmentId, ModuleId, OrganizationUnitId, RoleId, ScopedGrant, User, UserId, UserLookup,
};

/// Active assignment projection joined with its unit and role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveAssignment {
    /// Assignment identifier.
    pub assignment_id: AssignmentId,
    /// Organization unit identifier.
    pub unit_id: OrganizationUnitId,
    /// Organization unit name.
    pub unit_name: String,
    /// Role identifier.
    pub role_id: RoleId,
    /// Role name.
    pub role_name: String,
    /// Whether the role bypasses scoped checks.
    pub is_system_admin: bool,
}

/// Resolved caller context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    /// Resolved active user.
    pub user: User,
    /// Active assignments ordered by unit then role name.
    pub assignments: Vec<ActiveAssignment>,
    /// Whether any assigned role is a system-admin role.
    pub is_system_admin: bool,
}

/// Read-only repository port for permission resolution.
#[async_trait]
pub trait PermissionRepository: Send + Sync {
    /// Finds a user by id or email regardless of activity status.
    async fn find_user(&self, lookup: &UserLookup) -> AppResult<Option<User>>;

    /// Lists active assignments whose role and organization unit are both active.
    async fn list_active_assignments(&self, user_id: UserId) -> AppResult<Vec<ActiveAssignment>>;

    /// Lists grants of the given roles scoped to `module_id` or organization-wide.
    async fn list_scoped_grants(
        &self,
        role_ids: &[RoleId],
        module_id: ModuleId,
    ) -> AppResult<Vec<ScopedGrant>>;
}
