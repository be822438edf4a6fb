use std::sync::Arc;

use ergon_core::{AppError, AppResult, UserIdentity};
use ergon_domain::{ActionSet, PermissionAction, ResourceScope, User, UserLookup};

use crate::{PermissionCache, PermissionCacheKey, PermissionRepository, UserContext};

mod context;
mod resolution;


/// Application service resolving effective module, submodule and form access.
#[derive(Clone)]
pub struct PermissionService {
    repository: Arc<dyn PermissionRepository>,
    cache: Option<Arc<dyn PermissionCache>>,
    cache_ttl_seconds: u32,
}

impl PermissionService {
    /// Creates a permission service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn PermissionRepository>) -> Self {
        Self {
            repository,
            cache: None,
            cache_ttl_seconds: 0,
        }
    }

    /// Adds optional action-set caching behavior. A ttl of zero disables it.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn PermissionCache>, ttl_seconds: u32) -> Self {
        self.cache = Some(cache);
        self.cache_ttl_seconds = ttl_seconds;
        self
    }

    /// Returns the effective action set of the caller for `scope`.
    pub async fn resolve_actions(
        &self,
        identity: &UserIdentity,
        scope: ResourceScope,
    ) -> AppResult<ActionSet> {
        let user = self.require_active_user(identity).await?;
        self.resolve_for_user(&user, scope).await
    }

    /// Returns whether the caller holds `action` on `scope`.
    pub async fn has_action(
        &self,
        identity: &UserIdentity,
        scope: ResourceScope,
        action: PermissionAction,
    ) -> AppResult<bool> {
        Ok(self.resolve_actions(identity, scope).await?.allows(action))
    }

    /// Ensures the caller holds `action` on `scope`.
    pub async fn require_action(
        &self,
        identity: &UserIdentity,
        scope: ResourceScope,
        action: PermissionAction,
    ) -> AppResult<()> {
        if self.has_action(identity, scope, action).await? {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "user '{identity}' is missing '{}' access on {scope}",
            action.as_str()
        )))
    }

    async fn require_active_user(&self, identity: &UserIdentity) -> AppResult<User> {
        let lookup = UserLookup::from_identity(identity)?;
        let user = self
            .repository
            .find_user(&lookup)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user with {lookup} does not exist")))?;

        if !user.is_active() {
            return Err(AppError::NotFound(format!(
                "user with {lookup} is not active"
            )));
        }

        Ok(user)
    }
}

impl std::fmt::Debug for PermissionService {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("PermissionService")
            .field("cache_enabled", &self.cache.is_some())
            .field("cache_ttl_seconds", &self.cache_ttl_seconds)
            .finish()
    }
}
