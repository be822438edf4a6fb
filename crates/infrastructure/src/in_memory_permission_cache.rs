use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use ergon_application::{PermissionCache, PermissionCacheKey};
use ergon_core::AppResult;
use ergon_domain::ActionSet;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy)]
struct ActionSetCacheEntry {
    actions: ActionSet,
    expires_at: Instant,
}

/// In-memory cache adapter for resolved action sets.
#[derive(Debug, Default)]
pub struct InMemoryPermissionCache {
    entries: RwLock<HashMap<PermissionCacheKey, ActionSetCacheEntry>>,
}

impl InMemoryPermissionCache {
    /// Creates an empty in-memory permission cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PermissionCache for InMemoryPermissionCache {
    async fn get_action_set(&self, key: PermissionCacheKey) -> AppResult<Option<ActionSet>> {
        {
            let entries = self.entries.read().await;
            match entries.get(&key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Ok(Some(entry.actions));
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }

        let mut entries = self.entries.write().await;
        if entries
            .get(&key)
            .is_some_and(|entry| entry.expires_at <= Instant::now())
        {
            entries.remove(&key);
        }

        Ok(None)
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

        let now = Instant::now();
        let expires_at = now
            .checked_add(Duration::from_secs(u64::from(ttl_seconds)))
            .unwrap_or(now);

        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(key, ActionSetCacheEntry { actions, expires_at });

        Ok(())
    }
}
