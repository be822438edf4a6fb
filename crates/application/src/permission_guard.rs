use ergon_domain::{ActionSet, PermissionAction};

/// Outcome of guarding presentation content behind an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome<T> {
    /// The required action is allowed; carries the protected content.
    Granted(T),
    /// The action is missing; carries the caller-provided fallback.
    Fallback(T),
    /// The action is missing and no fallback was provided.
    AccessDenied,
}

impl<T> GuardOutcome<T> {
    /// Returns the rendered value, if any.
    pub fn into_inner(self) -> Option<T> {
        match self {
            Self::Granted(value) | Self::Fallback(value) => Some(value),
            Self::AccessDenied => None,
        }
    }
}

/// Gate for content that requires one action on an already resolved action set.
///
/// An unresolved action set (`None`) is treated as missing access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionGuard {
    required: PermissionAction,
}

impl PermissionGuard {
    /// Creates a guard requiring `required`.
    #[must_use]
    pub fn new(required: PermissionAction) -> Self {
        Self { required }
    }

    /// Returns the required action.
    #[must_use]
    pub fn required(&self) -> PermissionAction {
        self.required
    }

    /// Returns whether the action set satisfies this guard.
    #[must_use]
    pub fn is_satisfied(&self, actions: Option<&ActionSet>) -> bool {
        actions.is_some_and(|value| value.allows(self.required))
    }

    /// Renders `content` when satisfied, otherwise the access-denied placeholder.
    pub fn render<T>(
        &self,
        actions: Option<&ActionSet>,
        content: impl FnOnce() -> T,
    ) -> GuardOutcome<T> {
        if self.is_satisfied(actions) {
            GuardOutcome::Granted(content())
        } else {
            GuardOutcome::AccessDenied
        }
    }

    /// Renders `content` when satisfied, otherwise `fallback`.
    pub fn render_or<T>(
        &self,
        actions: Option<&ActionSet>,
        content: impl FnOnce() -> T,
        fallback: impl FnOnce() -> T,
    ) -> GuardOutcome<T> {
        if self.is_satisfied(actions) {
            GuardOutcome::Granted(content())
        } else {
            GuardOutcome::Fallback(fallback())
        }
    }
}
