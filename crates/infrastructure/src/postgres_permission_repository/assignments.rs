use super::*;

impl PostgresPermissionRepository {
    pub(super) async fn list_active_assignments_impl(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<ActiveAssignment>> {
        let rows = sqlx::query_as::<_, ActiveAssignmentRow>(
            r#"
            SELECT
                assignments.id AS assignment_id,
                units.id AS unit_id,
                units.name AS unit_name,
                roles.id AS role_id,
                roles.name AS role_name,
                roles.is_system_admin
            FROM user_unit_assignments AS assignments
            INNER JOIN roles
                ON roles.id = assignments.role_id
            INNER JOIN organization_units AS units
                ON units.id = assignments.unit_id
            WHERE assignments.user_id = $1
                AND assignments.is_active
                AND roles.is_active
                AND units.is_active
            ORDER BY units.name, roles.name
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load active assignments for user '{user_id}': {error}"
            ))
        })?;

        Ok(rows.into_iter().map(ActiveAssignment::from).collect())
    }
}
