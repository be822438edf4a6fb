//! Redis-backed permission action-set cache.

use async_trait::async_trait;
use ergon_application::{PermissionCache, PermissionCacheKey};
use ergon_core::{AppError, AppResult};
use ergon_domain::{ActionSet, PermissionAction};
use redis::AsyncCommands;

/// Redis implementation of the permission cache port.
#[derive(Clone)]
pub struct RedisPermissionCache {
    client: redis::Client,
    key_prefix: String,
}

impl RedisPermissionCache {
    /// Creates a cache adapter with a configured Redis client and key prefix.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn key_for(&self, key: PermissionCacheKey) -> String {
        let optional = |value: Option<String>| value.unwrap_or_else(|| "none".to_owned());

        format!(
            "{}:user={}:module={}:submodule={}:form={}",
            self.key_prefix,
            key.user_id,
            key.scope.module_id(),
            optional(key.scope.submodule_id().map(|value| value.to_string())),
            optional(key.scope.form_id().map(|value| value.to_string())),
        )
    }

    fn encode_actions(actions: ActionSet) -> String {
        PermissionAction::all()
            .iter()
            .map(|action| if actions.allows(*action) { '1' } else { '0' })
            .collect()
    }

    fn decode_actions(value: &str) -> AppResult<ActionSet> {
        let flags: Vec<char> = value.chars().collect();
        if flags.len() != PermissionAction::all().len() {
            return Err(AppError::Internal(format!(
                "invalid permission cache value '{value}'"
            )));
        }

        let mut actions = ActionSet::none();
        for (action, flag) in PermissionAction::all().iter().zip(flags) {
            let allowed = match flag {
                '1' => true,
                '0' => false,
                _ => {
                    return Err(AppError::Internal(format!(
                        "invalid permission cache flag '{flag}' for action '{}'",
                        action.as_str()
                    )));
                }
            };
            actions.set(*action, allowed);
        }

        Ok(actions)
    }
}

#[async_trait]
impl PermissionCache for RedisPermissionCache {
    async fn get_action_set(&self, key: PermissionCacheKey) -> AppResult<Option<ActionSet>> {
        let key = self.key_for(key);
        let mut connection = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))?;

        let encoded: Option<String> = connection.get(key).await.map_err(|error| {
            AppError::Internal(format!("failed to read permission cache entry: {error}"))
        })?;

        encoded.as_deref().map(Self::decode_actions).transpose()
    }

    async fn set_action_set(
        &self,
        key: PermissionCacheKey,
        actions: ActionSet,
        ttl_seconds: u32,
    ) -> AppResult<()> {
        if ttl_seconds == 0 {
            return Ok(());
        }

        let key = self.key_for(key);
        let value = Self::encode_actions(actions);
        let mut connection = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))?;

        connection
            .set_ex(key, value, u64::from(ttl_seconds))
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to write permission cache entry: {error}"))
            })
    }
}
