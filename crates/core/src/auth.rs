use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppError, AppResult};

/// Caller identity extracted from trusted request headers.
///
/// At least one of the user id or the email is always present. When both are
/// present, the user id takes precedence during lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    user_id: Option<Uuid>,
    email: Option<String>,
}

impl UserIdentity {
    /// Creates an identity from optional id and email claims.
    pub fn new(user_id: Option<Uuid>, email: Option<String>) -> AppResult<Self> {
        let email = email.and_then(|value| {
            let trimmed = value.trim().to_owned();
            (!trimmed.is_empty()).then_some(trimmed)
        });

        if user_id.is_none() && email.is_none() {
            return Err(AppError::Unauthorized(
                "a user id or user email is required".to_owned(),
            ));
        }

        Ok(Self { user_id, email })
    }

    /// Creates an identity from a user id claim.
    #[must_use]
    pub fn from_user_id(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
            email: None,
        }
    }

    /// Returns the user id claim, if present.
    #[must_use]
    pub fn user_id(&self) -> Option<Uuid> {
        self.user_id
    }

    /// Returns the email claim, if present.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

impl std::fmt::Display for UserIdentity {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.user_id, &self.email) {
            (Some(user_id), _) => write!(formatter, "{user_id}"),
            (None, Some(email)) => formatter.write_str(email),
            (None, None) => formatter.write_str("<anonymous>"),
        }
    }
}
