//! Action sets, resource scopes, and the most-specific-wins grant fold.

use std::str::FromStr;

use ergon_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::{FormId, ModuleId, RoleId, SubmoduleId};

/// Action a permission can grant against a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionAction {
    /// Read pages, lists and records.
    View,
    /// Create records.
    Create,
    /// Update records.
    Edit,
    /// Delete records.
    Delete,
    /// Administer the resource itself.
    Manage,
}

impl PermissionAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Create => "create",
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::Manage => "manage",
        }
    }

    /// Returns all known actions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[PermissionAction] = &[
            PermissionAction::View,
            PermissionAction::Create,
            PermissionAction::Edit,
            PermissionAction::Delete,
            PermissionAction::Manage,
        ];

        ALL
    }

    /// Parses a transport value into an action.
    pub fn from_transport(value: &str) -> AppResult<Self> {
        Self::from_str(value)
    }
}

impl FromStr for PermissionAction {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "view" | "read" => Ok(Self::View),
            "create" | "add" => Ok(Self::Create),
            "edit" | "update" => Ok(Self::Edit),
            "delete" => Ok(Self::Delete),
            "manage" => Ok(Self::Manage),
            _ => Err(AppError::Validation(format!(
                "unknown permission action '{value}'"
            ))),
        }
    }
}

/// Effective actions a user holds against one resource scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionSet {
    /// View access.
    pub can_view: bool,
    /// Create access.
    pub can_add: bool,
    /// Edit access.
    pub can_edit: bool,
    /// Delete access.
    pub can_delete: bool,
    /// Manage access.
    pub can_manage: bool,
}

impl ActionSet {
    /// Returns an action set with every flag cleared.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns an action set with every flag raised.
    #[must_use]
    pub fn full() -> Self {
        Self {
            can_view: true,
            can_add: true,
            can_edit: true,
            can_delete: true,
            can_manage: true,
        }
    }

    /// Returns whether an action is allowed by this set.
    #[must_use]
    pub fn allows(&self, action: PermissionAction) -> bool {
        match action {
            PermissionAction::View => self.can_view,
            PermissionAction::Create => self.can_add,
            PermissionAction::Edit => self.can_edit,
            PermissionAction::Delete => self.can_delete,
            PermissionAction::Manage => self.can_manage,
        }
    }

    /// Sets the flag for one action.
    pub fn set(&mut self, action: PermissionAction, allowed: bool) {
        match action {
            PermissionAction::View => self.can_view = allowed,
            PermissionAction::Create => self.can_add = allowed,
            PermissionAction::Edit => self.can_edit = allowed,
            PermissionAction::Delete => self.can_delete = allowed,
            PermissionAction::Manage => self.can_manage = allowed,
        }
    }

    /// Returns the allowed actions in declaration order.
    #[must_use]
    pub fn allowed_actions(&self) -> Vec<PermissionAction> {
        PermissionAction::all()
            .iter()
            .copied()
            .filter(|action| self.allows(*action))
            .collect()
    }

    /// Returns whether no action is allowed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::none()
    }
}

/// Resource a permission check targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceScope {
    module_id: ModuleId,
    submodule_id: Option<SubmoduleId>,
    form_id: Option<FormId>,
}

impl ResourceScope {
    /// Targets a whole module.
    #[must_use]
    pub fn module(module_id: ModuleId) -> Self {
        Self {
            module_id,
            submodule_id: None,
            form_id: None,
        }
    }

    /// Narrows the scope to a submodule.
    #[must_use]
    pub fn with_submodule(mut self, submodule_id: SubmoduleId) -> Self {
        self.submodule_id = Some(submodule_id);
        self
    }

    /// Narrows the scope to a form.
    #[must_use]
    pub fn with_form(mut self, form_id: FormId) -> Self {
        self.form_id = Some(form_id);
        self
    }

    /// Returns the target module.
    #[must_use]
    pub fn module_id(&self) -> ModuleId {
        self.module_id
    }

    /// Returns the target submodule, if any.
    #[must_use]
    pub fn submodule_id(&self) -> Option<SubmoduleId> {
        self.submodule_id
    }

    /// Returns the target form, if any.
    #[must_use]
    pub fn form_id(&self) -> Option<FormId> {
        self.form_id
    }
}

impl std::fmt::Display for ResourceScope {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "module '{}'", self.module_id)?;
        if let Some(submodule_id) = self.submodule_id {
            write!(formatter, " submodule '{submodule_id}'")?;
        }
        if let Some(form_id) = self.form_id {
            write!(formatter, " form '{form_id}'")?;
        }
        Ok(())
    }
}

/// Breadth of a role permission, ordered from broadest to narrowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeSpecificity {
    /// Applies to every module in the organization.
    Organization,
    /// Applies to one module.
    Module,
    /// Applies to one submodule.
    Submodule,
    /// Applies to one form.
    Form,
}

/// Resource narrowing stored on a role permission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GrantScope {
    module_id: Option<ModuleId>,
    submodule_id: Option<SubmoduleId>,
    form_id: Option<FormId>,
}

impl GrantScope {
    /// Creates a validated grant scope. Submodule and form narrowing require a module.
    pub fn new(
        module_id: Option<ModuleId>,
        submodule_id: Option<SubmoduleId>,
        form_id: Option<FormId>,
    ) -> AppResult<Self> {
        if module_id.is_none() && (submodule_id.is_some() || form_id.is_some()) {
            return Err(AppError::Validation(
                "submodule or form scoped grants must reference a module".to_owned(),
            ));
        }

        Ok(Self {
            module_id,
            submodule_id,
            form_id,
        })
    }

    /// Organization-wide scope.
    #[must_use]
    pub fn organization() -> Self {
        Self::default()
    }

    /// Module-wide scope.
    #[must_use]
    pub fn module(module_id: ModuleId) -> Self {
        Self {
            module_id: Some(module_id),
            submodule_id: None,
            form_id: None,
        }
    }

    /// Submodule scope.
    #[must_use]
    pub fn submodule(module_id: ModuleId, submodule_id: SubmoduleId) -> Self {
        Self {
            module_id: Some(module_id),
            submodule_id: Some(submodule_id),
            form_id: None,
        }
    }

    /// Form scope.
    #[must_use]
    pub fn form(module_id: ModuleId, form_id: FormId) -> Self {
        Self {
            module_id: Some(module_id),
            submodule_id: None,
            form_id: Some(form_id),
        }
    }

    /// Returns the scoped module, or `None` for organization-wide grants.
    #[must_use]
    pub fn module_id(&self) -> Option<ModuleId> {
        self.module_id
    }

    /// Returns the scoped submodule, if any.
    #[must_use]
    pub fn submodule_id(&self) -> Option<SubmoduleId> {
        self.submodule_id
    }

    /// Returns the scoped form, if any.
    #[must_use]
    pub fn form_id(&self) -> Option<FormId> {
        self.form_id
    }

    /// Returns the specificity rank of this scope.
    #[must_use]
    pub fn specificity(&self) -> ScopeSpecificity {
        if self.form_id.is_some() {
            ScopeSpecificity::Form
        } else if self.submodule_id.is_some() {
            ScopeSpecificity::Submodule
        } else if self.module_id.is_some() {
            ScopeSpecificity::Module
        } else {
            ScopeSpecificity::Organization
        }
    }

    /// Returns whether every identifier set on this scope equals the requested one.
    #[must_use]
    pub fn matches(&self, requested: &ResourceScope) -> bool {
        let module_matches = self
            .module_id
            .is_none_or(|module_id| module_id == requested.module_id());
        let submodule_matches = self
            .submodule_id
            .is_none_or(|submodule_id| Some(submodule_id) == requested.submodule_id());
        let form_matches = self
            .form_id
            .is_none_or(|form_id| Some(form_id) == requested.form_id());

        module_matches && submodule_matches && form_matches
    }
}

/// One role permission flattened for resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopedGrant {
    /// Role contributing the grant.
    pub role_id: RoleId,
    /// Action covered by the grant.
    pub action: PermissionAction,
    /// Resource narrowing.
    pub scope: GrantScope,
    /// Allow (`true`) or explicit deny (`false`).
    pub granted: bool,
}

/// Folds grants into an action set for `requested`.
///
/// For each action only the matching grants at the highest specificity are
/// considered; at that level the outcome is the OR of their `granted` flags.
/// A narrower deny therefore overrides a broader allow, and an allow from any
/// role at the narrowest level wins over denies from other roles at that level.
#[must_use]
pub fn resolve_action_set(grants: &[ScopedGrant], requested: &ResourceScope) -> ActionSet {
    let mut decisions: [Option<(ScopeSpecificity, bool)>; 5] = [None; 5];

    for grant in grants
        .iter()
        .filter(|grant| grant.scope.matches(requested))
    {
        let slot = &mut decisions[action_index(grant.action)];
        let specificity = grant.scope.specificity();

        *slot = match *slot {
            None => Some((specificity, grant.granted)),
            Some((current, _)) if specificity > current => Some((specificity, grant.granted)),
            Some((current, allowed)) if specificity == current => {
                Some((current, allowed || grant.granted))
            }
            keep => keep,
        };
    }

    let mut actions = ActionSet::none();
    for action in PermissionAction::all() {
        let allowed = decisions[action_index(*action)].is_some_and(|(_, allowed)| allowed);
        actions.set(*action, allowed);
    }

    actions
}

fn action_index(action: PermissionAction) -> usize {
    match action {
        PermissionAction::View => 0,
        PermissionAction::Create => 1,
        PermissionAction::Edit => 2,
        PermissionAction::Delete => 3,
        PermissionAction::Manage => 4,
    }
}
