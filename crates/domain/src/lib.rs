//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod access;
mod ids;
mod organization;
mod role;
mod user;

pub use access::{
    ActionSet, GrantScope, PermissionAction, ResourceScope, ScopeSpecificity, ScopedGrant,
    resolve_action_set,
};
pub use ids::{
    AssignmentId, FormId, ModuleId, OrganizationUnitId, PermissionId, RoleId, SubmoduleId, UserId,
};
pub use organization::{OrganizationUnit, validate_unit_placement};
pub use role::{Permission, Role, RolePermission, UnitAssignment};
pub use user::{EmailAddress, User, UserLookup};
