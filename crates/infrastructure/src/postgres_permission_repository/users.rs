use super::*;

impl PostgresPermissionRepository {
    pub(super) async fn find_user_impl(&self, lookup: &UserLookup) -> AppResult<Option<User>> {
        let query = match lookup {
            UserLookup::Id(user_id) => sqlx::query_as::<_, UserRow>(
                r#"
                SELECT id, email, display_name, organization_id, is_active
                FROM users
                WHERE id = $1
                "#,
            )
            .bind(user_id.as_uuid()),
            UserLookup::Email(email) => sqlx::query_as::<_, UserRow>(
                r#"
                SELECT id, email, display_name, organization_id, is_active
                FROM users
                WHERE email = $1
                "#,
            )
            .bind(email.as_str().to_owned()),
        };

        let row = query.fetch_optional(&self.pool).await.map_err(|error| {
            AppError::Internal(format!("failed to find user with {lookup}: {error}"))
        })?;

        row.map(User::try_from).transpose()
    }
}
