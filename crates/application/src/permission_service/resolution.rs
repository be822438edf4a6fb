use std::collections::BTreeSet;

use ergon_domain::resolve_action_set;

use super::*;

impl PermissionService {
    pub(super) async fn resolve_for_user(
        &self,
        user: &User,
        scope: ResourceScope,
    ) -> AppResult<ActionSet> {
        let key = PermissionCacheKey {
            user_id: user.id(),
            scope,
        };

        if self.cache_ttl_seconds > 0
            && let Some(cache) = &self.cache
            && let Some(actions) = cache.get_action_set(key).await?
        {
            return Ok(actions);
        }

        let actions = self.compute_action_set(user, scope).await?;

        if self.cache_ttl_seconds > 0
            && let Some(cache) = &self.cache
        {
            cache
                .set_action_set(key, actions, self.cache_ttl_seconds)
                .await?;
        }

        Ok(actions)
    }

    async fn compute_action_set(&self, user: &User, scope: ResourceScope) -> AppResult<ActionSet> {
        let assignments = self.repository.list_active_assignments(user.id()).await?;

        if assignments.is_empty() {
            return Ok(ActionSet::none());
        }

        if assignments.iter().any(|assignment| assignment.is_system_admin) {
            return Ok(ActionSet::full());
        }

        let role_ids: Vec<_> = assignments
            .iter()
            .map(|assignment| assignment.role_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let grants = self
            .repository
            .list_scoped_grants(&role_ids, scope.module_id())
            .await?;

        Ok(resolve_action_set(&grants, &scope))
    }
}
