mod common;
mod permissions;

pub use common::{HealthDependencyStatus, HealthResponse};
pub use permissions::{
    ActionSetResponse, PermissionCheckQuery, PermissionScopeQuery, UserAssignmentResponse,
    UserContextResponse,
};
