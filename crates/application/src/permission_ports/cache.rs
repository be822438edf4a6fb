use async_trait::async_trait;
use ergon_core::AppResult;
use ergon_domain::{ActionSet, ResourceScope, UserId};

/// Cache key for one resolved action set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PermissionCacheKey {
    /// Resolved user.
    pub user_id: UserId,
    /// Requested resource scope.
    pub scope: ResourceScope,
}

/// Optional cache port for resolved action sets.
#[async_trait]
pub trait PermissionCache: Send + Sync {
    /// Returns a cached action set for one key.
    async fn get_action_set(&self, key: PermissionCacheKey) -> AppResult<Option<ActionSet>>;

    /// Stores an action set for one key with ttl.
    async fn set_action_set(
        &self,
        key: PermissionCacheKey,
        actions: ActionSet,
        ttl_seconds: u32,
    ) -> AppResult<()>;
}
