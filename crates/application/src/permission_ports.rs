mod cache;
mod repository;

pub use cache::{PermissionCache, PermissionCacheKey};
pub use repository::{ActiveAssignment, PermissionRepository, UserContext};
