//! User domain types and lookup keys.

use ergon_core::{AppError, AppResult, NonEmptyString, OrganizationId, UserIdentity};
use serde::{Deserialize, Serialize};

use crate::UserId;

/// Validated, lower-cased email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// Performs basic structural validation: non-empty, contains exactly one `@`,
    /// local part and domain are non-empty, domain contains at least one `.`.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let normalized = value.trim().to_lowercase();

        if normalized.is_empty() {
            return Err(AppError::Validation(
                "email address must not be empty".to_owned(),
            ));
        }

        let Some((local, domain)) = normalized.split_once('@') else {
            return Err(AppError::Validation(
                "email address must contain an '@'".to_owned(),
            ));
        };

        if local.is_empty() {
            return Err(AppError::Validation(
                "email local part must not be empty".to_owned(),
            ));
        }

        if domain.is_empty() || domain.contains('@') || !domain.contains('.') {
            return Err(AppError::Validation(format!(
                "email domain '{domain}' is invalid"
            )));
        }

        if normalized.len() > 254 {
            return Err(AppError::Validation(
                "email address must not exceed 254 characters".to_owned(),
            ));
        }

        Ok(Self(normalized))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Key used to locate a user record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UserLookup {
    /// Lookup by primary identifier.
    Id(UserId),
    /// Lookup by unique email address.
    Email(EmailAddress),
}

impl UserLookup {
    /// Builds a lookup from a caller identity, preferring the user id claim.
    pub fn from_identity(identity: &UserIdentity) -> AppResult<Self> {
        if let Some(user_id) = identity.user_id() {
            return Ok(Self::Id(UserId::from_uuid(user_id)));
        }

        match identity.email() {
            Some(email) => EmailAddress::new(email).map(Self::Email).map_err(|_| {
                AppError::Unauthorized(format!("caller email '{email}' is not a valid address"))
            }),
            None => Err(AppError::Unauthorized(
                "a user id or user email is required".to_owned(),
            )),
        }
    }
}

impl std::fmt::Display for UserLookup {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(user_id) => write!(formatter, "id '{user_id}'"),
            Self::Email(email) => write!(formatter, "email '{}'", email.as_str()),
        }
    }
}

/// Persisted user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    email: EmailAddress,
    display_name: NonEmptyString,
    organization_id: Option<OrganizationId>,
    is_active: bool,
}

impl User {
    /// Creates a validated user.
    pub fn new(
        id: UserId,
        email: impl Into<String>,
        display_name: impl Into<String>,
        organization_id: Option<OrganizationId>,
        is_active: bool,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            email: EmailAddress::new(email)?,
            display_name: NonEmptyString::new(display_name)?,
            organization_id,
            is_active,
        })
    }

    /// Returns the user identifier.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Returns the user email.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns the display name.
    #[must_use]
    pub fn display_name(&self) -> &NonEmptyString {
        &self.display_name
    }

    /// Returns the owning organization, if any.
    #[must_use]
    pub fn organization_id(&self) -> Option<OrganizationId> {
        self.organization_id
    }

    /// Returns whether the account is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns whether the user can be selected by `lookup`.
    #[must_use]
    pub fn matches(&self, lookup: &UserLookup) -> bool {
        match lookup {
            UserLookup::Id(user_id) => &self.id == user_id,
            UserLookup::Email(email) => &self.email == email,
        }
    }
}

#[cfg(test)]
mod tests {
    use ergon_core::{AppError, UserIdentity};
    use uuid::Uuid;

    use super::{EmailAddress, UserLookup};

    #[test]
    fn email_is_normalized() {
        let email = EmailAddress::new("  Payroll@Example.COM ");
        assert_eq!(
            email.map(String::from).ok().as_deref(),
            Some("payroll@example.com")
        );
    }

    #[test]
    fn email_without_domain_dot_is_rejected() {
        assert!(EmailAddress::new("payroll@localhost").is_err());
        assert!(EmailAddress::new("a@b@example.com").is_err());
        assert!(EmailAddress::new("@example.com").is_err());
    }

    #[test]
    fn lookup_prefers_user_id() {
        let user_id = Uuid::new_v4();
        let identity = UserIdentity::new(Some(user_id), Some("hr@example.com".to_owned()));
        let lookup = identity
            .as_ref()
            .ok()
            .map(UserLookup::from_identity)
            .and_then(Result::ok);

        assert!(matches!(lookup, Some(UserLookup::Id(id)) if id.as_uuid() == user_id));
    }

    #[test]
    fn lookup_falls_back_to_email() {
        let identity = UserIdentity::new(None, Some("HR@example.com".to_owned()));
        let lookup = identity
            .as_ref()
            .ok()
            .map(UserLookup::from_identity)
            .and_then(Result::ok);

        assert!(matches!(lookup, Some(UserLookup::Email(email)) if email.as_str() == "hr@example.com"));
    }

    #[test]
    fn malformed_email_claim_is_unauthorized() {
        let identity = UserIdentity::new(None, Some("bob".to_owned()))
            .unwrap_or_else(|_| unreachable!());

        assert!(matches!(
            UserLookup::from_identity(&identity),
            Err(AppError::Unauthorized(_))
        ));
    }
}
