use super::*;

impl PermissionService {
    /// Returns the caller's user record, active assignments and admin flag.
    pub async fn user_context(&self, identity: &UserIdentity) -> AppResult<UserContext> {
        let user = self.require_active_user(identity).await?;
        let mut assignments = self.repository.list_active_assignments(user.id()).await?;
        assignments.sort_by(|left, right| {
            left.unit_name
                .cmp(&right.unit_name)
                .then_with(|| left.role_name.cmp(&right.role_name))
        });

        let is_system_admin = assignments
            .iter()
            .any(|assignment| assignment.is_system_admin);

        Ok(UserContext {
            user,
            assignments,
            is_system_admin,
        })
    }
}
