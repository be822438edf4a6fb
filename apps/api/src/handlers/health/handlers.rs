use super::checks::{check_postgres, check_redis};
use super::*;

/// Reports dependency status. Redis only gates readiness while it serves the permission cache.
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let postgres = check_postgres(state.postgres_pool.clone()).await;
    let redis = check_redis(state.redis_client.clone(), state.redis_required).await;

    let ready = dependencies_ready(&postgres, &redis, state.redis_required);
    let http_status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        http_status,
        Json(HealthResponse {
            status: if ready { "ok" } else { "degraded" },
            ready,
            postgres,
            redis,
            permission_cache: state.permission_cache,
        }),
    )
}

pub(super) fn dependencies_ready(
    postgres: &HealthDependencyStatus,
    redis: &HealthDependencyStatus,
    redis_required: bool,
) -> bool {
    postgres.status == "ok" && (!redis_required || redis.status == "ok")
}
