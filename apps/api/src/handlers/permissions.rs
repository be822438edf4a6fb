use axum::Json;
use axum::extract::{Extension, Query, State};
use axum::http::StatusCode;
use ergon_core::UserIdentity;
use tracing::debug;

use crate::dto::{
    ActionSetResponse, PermissionCheckQuery, PermissionScopeQuery, UserContextResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;


pub async fn effective_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<PermissionScopeQuery>,
) -> ApiResult<Json<ActionSetResponse>> {
    let scope = query.to_scope()?;
    let actions = state
        .permission_service
        .resolve_actions(&user, scope)
        .await?;

    Ok(Json(ActionSetResponse::new(scope, actions)))
}

pub async fn check_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<PermissionCheckQuery>,
) -> ApiResult<StatusCode> {
    let scope = query.to_scope()?;
    let action = query.to_action()?;

    state
        .permission_service
        .require_action(&user, scope, action)
        .await?;

    debug!(user = %user, %scope, action = action.as_str(), "permission check granted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn user_context_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<UserContextResponse>> {
    let context = state.permission_service.user_context(&user).await?;

    Ok(Json(UserContextResponse::from(context)))
}
