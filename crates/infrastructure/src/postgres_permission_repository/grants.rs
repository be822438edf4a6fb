use tracing::debug;

use super::*;

impl PostgresPermissionRepository {
    pub(super) async fn list_scoped_grants_impl(
        &self,
        role_ids: &[RoleId],
        module_id: ModuleId,
    ) -> AppResult<Vec<ScopedGrant>> {
        if role_ids.is_empty() {
            return Ok(Vec::new());
        }

        let role_uuids: Vec<Uuid> = role_ids.iter().map(RoleId::as_uuid).collect();

        let rows = sqlx::query_as::<_, ScopedGrantRow>(
            r#"
            SELECT
                role_permissions.role_id,
                permissions.action,
                role_permissions.module_id,
                role_permissions.submodule_id,
                role_permissions.form_id,
                role_permissions.granted
            FROM role_permissions
            INNER JOIN permissions
                ON permissions.id = role_permissions.permission_id
            WHERE role_permissions.role_id = ANY($1)
                AND (role_permissions.module_id IS NULL OR role_permissions.module_id = $2)
            "#,
        )
        .bind(role_uuids)
        .bind(module_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load role permissions for module '{module_id}': {error}"
            ))
        })?;

        debug!(
            module_id = %module_id,
            roles = role_ids.len(),
            grants = rows.len(),
            "loaded scoped role permissions"
        );

        rows.into_iter().map(ScopedGrant::try_from).collect()
    }
}
