use ergon_application::{ActiveAssignment, UserContext};
use ergon_core::{AppError, AppResult};
use ergon_domain::{
    ActionSet, FormId, ModuleId, PermissionAction, ResourceScope, SubmoduleId,
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;


/// Query string selecting a module, submodule or form.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-scope-query.ts"
)]
pub struct PermissionScopeQuery {
    pub module_id: Option<String>,
    pub submodule_id: Option<String>,
    pub form_id: Option<String>,
}

impl PermissionScopeQuery {
    /// Parses the query into a resource scope. The module is mandatory.
    pub fn to_scope(&self) -> AppResult<ResourceScope> {
        parse_scope(
            self.module_id.as_deref(),
            self.submodule_id.as_deref(),
            self.form_id.as_deref(),
        )
    }
}

/// Query string selecting a scope plus the action to check.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-check-query.ts"
)]
pub struct PermissionCheckQuery {
    pub module_id: Option<String>,
    pub submodule_id: Option<String>,
    pub form_id: Option<String>,
    pub action: Option<String>,
}

impl PermissionCheckQuery {
    pub fn to_scope(&self) -> AppResult<ResourceScope> {
        parse_scope(
            self.module_id.as_deref(),
            self.submodule_id.as_deref(),
            self.form_id.as_deref(),
        )
    }

    pub fn to_action(&self) -> AppResult<PermissionAction> {
        let action = non_blank(self.action.as_deref())
            .ok_or_else(|| AppError::Validation("action is required".to_owned()))?;
        PermissionAction::from_transport(action)
    }
}

/// Effective actions of the caller on one scope.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/action-set-response.ts"
)]
pub struct ActionSetResponse {
    pub module_id: String,
    pub submodule_id: Option<String>,
    pub form_id: Option<String>,
    pub can_view: bool,
    pub can_add: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_manage: bool,
    pub allowed_actions: Vec<String>,
}

impl ActionSetResponse {
    #[must_use]
    pub fn new(scope: ResourceScope, actions: ActionSet) -> Self {
        Self {
            module_id: scope.module_id().to_string(),
            submodule_id: scope.submodule_id().map(|value| value.to_string()),
            form_id: scope.form_id().map(|value| value.to_string()),
            can_view: actions.can_view,
            can_add: actions.can_add,
            can_edit: actions.can_edit,
            can_delete: actions.can_delete,
            can_manage: actions.can_manage,
            allowed_actions: actions
                .allowed_actions()
                .into_iter()
                .map(|action| action.as_str().to_owned())
                .collect(),
        }
    }
}

/// API representation of one active unit assignment.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-assignment-response.ts"
)]
pub struct UserAssignmentResponse {
    pub assignment_id: String,
    pub unit_id: String,
    pub unit_name: String,
    pub role_id: String,
    pub role_name: String,
    pub is_system_admin: bool,
}

impl From<ActiveAssignment> for UserAssignmentResponse {
    fn from(value: ActiveAssignment) -> Self {
        Self {
            assignment_id: value.assignment_id.to_string(),
            unit_id: value.unit_id.to_string(),
            unit_name: value.unit_name,
            role_id: value.role_id.to_string(),
            role_name: value.role_name,
            is_system_admin: value.is_system_admin,
        }
    }
}

/// API representation of the resolved caller.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-context-response.ts"
)]
pub struct UserContextResponse {
    pub user_id: String,
    pub email: String,
    pub display_name: String,
    pub organization_id: Option<String>,
    pub is_system_admin: bool,
    pub assignments: Vec<UserAssignmentResponse>,
}

impl From<UserContext> for UserContextResponse {
    fn from(value: UserContext) -> Self {
        Self {
            user_id: value.user.id().to_string(),
            email: value.user.email().as_str().to_owned(),
            display_name: value.user.display_name().as_str().to_owned(),
            organization_id: value
                .user
                .organization_id()
                .map(|organization_id| organization_id.to_string()),
            is_system_admin: value.is_system_admin,
            assignments: value
                .assignments
                .into_iter()
                .map(UserAssignmentResponse::from)
                .collect(),
        }
    }
}

fn parse_scope(
    module_id: Option<&str>,
    submodule_id: Option<&str>,
    form_id: Option<&str>,
) -> AppResult<ResourceScope> {
    let module_id = non_blank(module_id)
        .ok_or_else(|| AppError::Validation("module_id is required".to_owned()))?;
    let mut scope = ResourceScope::module(ModuleId::from_uuid(parse_uuid(
        "module_id",
        module_id,
    )?));

    if let Some(submodule_id) = non_blank(submodule_id) {
        scope = scope.with_submodule(SubmoduleId::from_uuid(parse_uuid(
            "submodule_id",
            submodule_id,
        )?));
    }
    if let Some(form_id) = non_blank(form_id) {
        scope = scope.with_form(FormId::from_uuid(parse_uuid("form_id", form_id)?));
    }

    Ok(scope)
}

fn parse_uuid(field: &str, value: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|error| AppError::Validation(format!("invalid {field} '{value}': {error}")))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
