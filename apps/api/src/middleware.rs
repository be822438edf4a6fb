use axum::extract::Request;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use ergon_core::{AppError, AppResult, UserIdentity};
use uuid::Uuid;

use crate::error::ApiResult;

/// Header carrying the caller's user id, set by the upstream gateway.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the caller's email, set by the upstream gateway.
pub const USER_EMAIL_HEADER: &str = "x-user-email";

pub async fn require_identity(mut request: Request, next: Next) -> ApiResult<Response> {
    let identity = identity_from_headers(request.headers())?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

pub(crate) fn identity_from_headers(headers: &HeaderMap) -> AppResult<UserIdentity> {
    let user_id = header_value(headers, USER_ID_HEADER)?
        .map(|value| {
            Uuid::parse_str(value).map_err(|error| {
                AppError::Validation(format!("invalid {USER_ID_HEADER} header: {error}"))
            })
        })
        .transpose()?;
    let email = header_value(headers, USER_EMAIL_HEADER)?.map(ToOwned::to_owned);

    UserIdentity::new(user_id, email)
        .map_err(|_| AppError::Unauthorized("authentication required".to_owned()))
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> AppResult<Option<&'a str>> {
    let Some(value) = headers.get(name) else {
        return Ok(None);
    };

    let value = value
        .to_str()
        .map_err(|_| AppError::Validation(format!("{name} header must be visible ASCII")))?
        .trim();

    Ok((!value.is_empty()).then_some(value))
}
