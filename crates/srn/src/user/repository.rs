//! Queries on the `users` table.

use tracing::{debug, instrument};

use super::models::{Registration, Role, UserRecord};
use crate::auth::Identity;
use crate::store::{StoreHandle, StoreResult};

impl StoreHandle {
    /// Look up the stored role for `identity`. `None` when unregistered.
    #[instrument(skip(self, identity), fields(subject_id = %identity.subject_id))]
    pub async fn find_role(&self, identity: &Identity) -> StoreResult<Option<Role>> {
        Ok(self
            .get_user(&identity.subject_id)
            .await?
            .map(|user| user.role))
    }

    /// Get a user record by subject id.
    #[instrument(skip(self))]
    pub async fn get_user(&self, subject_id: &str) -> StoreResult<Option<UserRecord>> {
        let scope = self.owned_rows();
        let sql = format!(
            r#"
            SELECT user_id, email, role, created_at
            FROM users
            WHERE user_id = ? AND {}
            "#,
            scope.predicate("user_id")
        );

        let mut query = sqlx::query_as::<_, UserRecord>(&sql).bind(subject_id);
        if let Some(owner) = scope.owner() {
            query = query.bind(owner);
        }

        Ok(query.fetch_optional(self.pool()).await?)
    }

    /// Insert the record if absent. An existing record is returned unchanged.
    #[instrument(skip(self, email))]
    pub async fn upsert_user_record(
        &self,
        subject_id: &str,
        email: &str,
        default_role: Role,
    ) -> StoreResult<Registration> {
        self.ensure_writable("users", subject_id)?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO users (user_id, email, role)
            VALUES (?, ?, ?)
            ON CONFLICT(user_id) DO NOTHING
            "#,
        )
        .bind(subject_id)
        .bind(email)
        .bind(default_role)
        .execute(self.pool())
        .await?
        .rows_affected()
            > 0;

        let record = self
            .get_user(subject_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        if inserted {
            debug!("registered user {}", subject_id);
            Ok(Registration::Created(record))
        } else {
            Ok(Registration::Existing(record))
        }
    }

    /// Change a user's role. `None` when no such user is visible.
    #[instrument(skip(self))]
    pub async fn set_role(&self, subject_id: &str, role: Role) -> StoreResult<Option<UserRecord>> {
        let scope = self.owned_rows();
        let sql = format!(
            "UPDATE users SET role = ? WHERE user_id = ? AND {}",
            scope.predicate("user_id")
        );

        let mut query = sqlx::query(&sql).bind(role).bind(subject_id);
        if let Some(owner) = scope.owner() {
            query = query.bind(owner);
        }

        if query.execute(self.pool()).await?.rows_affected() == 0 {
            return Ok(None);
        }

        debug!("role of {} set to {}", subject_id, role);
        self.get_user(subject_id).await
    }
}
