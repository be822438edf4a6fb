use std::sync::Arc;

use ergon_application::{PermissionCache, PermissionService};
use ergon_core::{AppError, AppResult};
use ergon_infrastructure::{
    InMemoryPermissionCache, PostgresPermissionRepository, RedisPermissionCache,
};
use sqlx::PgPool;
use tracing::info;

use crate::api_config::{ApiConfig, PermissionCacheBackend};
use crate::state::AppState;

use super::redis::build_redis_client;

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> Result<AppState, AppError> {
    let redis_client = config
        .redis_url
        .as_deref()
        .map(build_redis_client)
        .transpose()?;

    let mut permission_service =
        PermissionService::new(Arc::new(PostgresPermissionRepository::new(pool.clone())));

    if config.permission_cache_ttl_seconds > 0 {
        let cache = build_permission_cache(config, redis_client.clone())?;
        permission_service =
            permission_service.with_cache(cache, config.permission_cache_ttl_seconds);
    } else {
        info!("permission cache disabled");
    }

    Ok(AppState {
        permission_service,
        postgres_pool: pool,
        redis_client,
        redis_required: config.redis_required(),
        permission_cache: config.permission_cache_mode(),
    })
}

fn build_permission_cache(
    config: &ApiConfig,
    redis_client: Option<redis::Client>,
) -> AppResult<Arc<dyn PermissionCache>> {
    match config.permission_cache_backend {
        PermissionCacheBackend::InMemory => Ok(Arc::new(InMemoryPermissionCache::new())),
        PermissionCacheBackend::Redis => {
            let redis_client = redis_client.ok_or_else(|| {
                AppError::Validation(
                    "REDIS_URL is required when PERMISSION_CACHE_BACKEND=redis".to_owned(),
                )
            })?;
            Ok(Arc::new(RedisPermissionCache::new(
                redis_client,
                "ergon:permissions",
            )))
        }
    }
}
