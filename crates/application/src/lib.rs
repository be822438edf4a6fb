//! Application services and ports.

#![forbid(unsafe_code)]

mod permission_guard;
mod permission_ports;
mod permission_service;

pub use permission_guard::{GuardOutcome, PermissionGuard};
pub use permission_ports::{
    ActiveAssignment, PermissionCache, PermissionCacheKey, PermissionRepository, UserContext,
};
pub use permission_service::PermissionService;
