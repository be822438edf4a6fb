use ergon_core::{AppError, AppResult, NonEmptyString, OrganizationId};
use serde::{Deserialize, Serialize};

use crate::{
    AssignmentId, GrantScope, OrganizationUnitId, PermissionAction, PermissionId, RoleId,
    ScopedGrant, UserId,
};

/// Named capability independent of any role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    id: PermissionId,
    category: NonEmptyString,
    resource: NonEmptyString,
    action: PermissionAction,
}

impl Permission {
    /// Creates a validated permission.
    pub fn new(
        id: PermissionId,
        category: impl Into<String>,
        resource: impl Into<String>,
        action: PermissionAction,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            category: NonEmptyString::new(category)?,
            resource: NonEmptyString::new(resource)?,
            action,
        })
    }

    /// Returns the permission identifier.
    #[must_use]
    pub fn id(&self) -> PermissionId {
        self.id
    }

    /// Returns the permission category.
    #[must_use]
    pub fn category(&self) -> &NonEmptyString {
        &self.category
    }

    /// Returns the guarded resource name.
    #[must_use]
    pub fn resource(&self) -> &NonEmptyString {
        &self.resource
    }

    /// Returns the granted action.
    #[must_use]
    pub fn action(&self) -> PermissionAction {
        self.action
    }

    /// Returns the stable `category.resource.action` name.
    #[must_use]
    pub fn name(&self) -> String {
        format!(
            "{}.{}.{}",
            self.category.as_str(),
            self.resource.as_str(),
            self.action.as_str()
        )
    }
}

/// Organization-scoped bundle of permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    id: RoleId,
    organization_id: OrganizationId,
    name: NonEmptyString,
    is_system_admin: bool,
    is_active: bool,
}

impl Role {
    /// Creates a validated role.
    pub fn new(
        id: RoleId,
        organization_id: OrganizationId,
        name: impl Into<String>,
        is_system_admin: bool,
        is_active: bool,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            organization_id,
            name: NonEmptyString::new(name)?,
            is_system_admin,
            is_active,
        })
    }

    /// Returns the role identifier.
    #[must_use]
    pub fn id(&self) -> RoleId {
        self.id
    }

    /// Returns the owning organization.
    #[must_use]
    pub fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }

    /// Returns the role name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns whether the role bypasses scoped checks.
    #[must_use]
    pub fn is_system_admin(&self) -> bool {
        self.is_system_admin
    }

    /// Returns whether the role is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }
}

/// Permission attached to a role, optionally narrowed to a module, submodule or form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePermission {
    role_id: RoleId,
    permission_id: PermissionId,
    scope: GrantScope,
    granted: bool,
    can_delegate: bool,
}

impl RolePermission {
    /// Creates a role permission entry.
    pub fn new(
        role_id: RoleId,
        permission_id: PermissionId,
        scope: GrantScope,
        granted: bool,
        can_delegate: bool,
    ) -> AppResult<Self> {
        if can_delegate && !granted {
            return Err(AppError::Validation(format!(
                "role '{role_id}' cannot delegate denied permission '{permission_id}'"
            )));
        }

        Ok(Self {
            role_id,
            permission_id,
            scope,
            granted,
            can_delegate,
        })
    }

    /// Returns the owning role.
    #[must_use]
    pub fn role_id(&self) -> RoleId {
        self.role_id
    }

    /// Returns the referenced permission.
    #[must_use]
    pub fn permission_id(&self) -> PermissionId {
        self.permission_id
    }

    /// Returns the resource narrowing.
    #[must_use]
    pub fn scope(&self) -> GrantScope {
        self.scope
    }

    /// Returns whether this entry allows (`true`) or denies (`false`).
    #[must_use]
    pub fn granted(&self) -> bool {
        self.granted
    }

    /// Returns whether holders may delegate this grant.
    #[must_use]
    pub fn can_delegate(&self) -> bool {
        self.can_delegate
    }

    /// Flattens this entry with the referenced permission's action.
    #[must_use]
    pub fn to_scoped_grant(&self, action: PermissionAction) -> ScopedGrant {
        ScopedGrant {
            role_id: self.role_id,
            action,
            scope: self.scope,
            granted: self.granted,
        }
    }
}

/// Grants a role to a user inside one organization unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitAssignment {
    id: AssignmentId,
    user_id: UserId,
    unit_id: OrganizationUnitId,
    role_id: RoleId,
    is_active: bool,
}

impl UnitAssignment {
    /// Creates an assignment.
    #[must_use]
    pub fn new(
        id: AssignmentId,
        user_id: UserId,
        unit_id: OrganizationUnitId,
        role_id: RoleId,
        is_active: bool,
    ) -> Self {
        Self {
            id,
            user_id,
            unit_id,
            role_id,
            is_active,
        }
    }

    /// Returns the assignment identifier.
    #[must_use]
    pub fn id(&self) -> AssignmentId {
        self.id
    }

    /// Returns the assigned user.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the organization unit.
    #[must_use]
    pub fn unit_id(&self) -> OrganizationUnitId {
        self.unit_id
    }

    /// Returns the granted role.
    #[must_use]
    pub fn role_id(&self) -> RoleId {
        self.role_id
    }

    /// Returns whether the assignment is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }
}
