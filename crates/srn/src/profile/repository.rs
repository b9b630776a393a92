//! Queries on the `personal_details` table.

use once_cell::sync::Lazy;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::models::{
    DETAIL_COLUMNS, PersonalDetails, PersonalDetailsInput, PersonalDetailsQuery,
    PersonalDetailsSummary,
};
use crate::auth::Identity;
use crate::store::{StoreHandle, StoreResult};

const DETAILS_SELECT: &str = r#"
    SELECT id, user_id, email, name, father_name, nationality, phone_number,
           date_of_birth, caste, gender, gotra, education, occupation,
           postal_address, mother_tongue, marital_status, state, district,
           adhaar, created_at, updated_at
    FROM personal_details
"#;

const SUMMARY_SELECT: &str = r#"
    SELECT id, user_id, email, adhaar, name, phone_number, district,
           nationality, state, caste, gender, gotra, marital_status, created_at
    FROM personal_details
"#;

/// Insert a row, or on an existing `user_id` overwrite only the supplied
/// columns.
static UPSERT_SQL: Lazy<String> = Lazy::new(|| {
    let columns = DETAIL_COLUMNS.join(", ");
    let placeholders = vec!["?"; DETAIL_COLUMNS.len()].join(", ");
    let updates = DETAIL_COLUMNS
        .iter()
        .map(|c| format!("{c} = COALESCE(excluded.{c}, personal_details.{c})"))
        .collect::<Vec<_>>()
        .join(",\n    ");

    format!(
        "INSERT INTO personal_details (id, user_id, email, {columns})\n\
         VALUES (?, ?, ?, {placeholders})\n\
         ON CONFLICT(user_id) DO UPDATE SET\n    \
         email = excluded.email,\n    \
         {updates},\n    \
         updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')"
    )
});

impl StoreHandle {
    /// Personal details of `user_id`, if saved and visible to this handle.
    #[instrument(skip(self))]
    pub async fn get_personal_details(&self, user_id: &str) -> StoreResult<Option<PersonalDetails>> {
        let scope = self.owned_rows();
        let sql = format!(
            "{DETAILS_SELECT} WHERE user_id = ? AND {}",
            scope.predicate("user_id")
        );

        let mut query = sqlx::query_as::<_, PersonalDetails>(&sql).bind(user_id);
        if let Some(owner) = scope.owner() {
            query = query.bind(owner);
        }

        Ok(query.fetch_optional(self.pool()).await?)
    }

    /// Create or update the personal details row of `owner`.
    #[instrument(skip(self, owner, input), fields(user_id = %owner.subject_id))]
    pub async fn upsert_personal_details(
        &self,
        owner: &Identity,
        input: &PersonalDetailsInput,
    ) -> StoreResult<PersonalDetails> {
        self.ensure_writable("personal_details", &owner.subject_id)?;

        let mut query = sqlx::query(UPSERT_SQL.as_str())
            .bind(Uuid::new_v4().to_string())
            .bind(&owner.subject_id)
            .bind(&owner.email);
        for value in input.values() {
            query = query.bind(value);
        }
        query.execute(self.pool()).await?;

        debug!("saved personal details for {}", owner.subject_id);

        Ok(self
            .get_personal_details(&owner.subject_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?)
    }

    /// Every visible row, newest first.
    #[instrument(skip(self))]
    pub async fn list_personal_details(&self) -> StoreResult<Vec<PersonalDetails>> {
        let scope = self.owned_rows();
        let sql = format!(
            "{DETAILS_SELECT} WHERE {} ORDER BY created_at DESC, rowid DESC",
            scope.predicate("user_id")
        );

        let mut query = sqlx::query_as::<_, PersonalDetails>(&sql);
        if let Some(owner) = scope.owner() {
            query = query.bind(owner);
        }

        Ok(query.fetch_all(self.pool()).await?)
    }

    /// Filtered, paginated listing ordered by name. Returns the page and the
    /// total number of matching rows.
    #[instrument(skip(self))]
    pub async fn search_personal_details(
        &self,
        filters: &PersonalDetailsQuery,
    ) -> StoreResult<(Vec<PersonalDetailsSummary>, i64)> {
        let scope = self.owned_rows();
        let mut conditions = vec![scope.predicate("user_id")];
        let mut bind_values: Vec<String> = Vec::new();

        if let Some(owner) = scope.owner() {
            bind_values.push(owner.to_string());
        }

        if let Some(search) = filters.search_term() {
            conditions.push(r"name LIKE ? ESCAPE '\'".to_string());
            bind_values.push(format!("%{}%", escape_like(search)));
        }

        for (column, value) in filters.equality_filters() {
            conditions.push(format!("{column} = ?"));
            bind_values.push(value.to_string());
        }

        let where_clause = conditions.join(" AND ");

        let count_sql = format!("SELECT COUNT(*) FROM personal_details WHERE {where_clause}");
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for value in &bind_values {
            count_query = count_query.bind(value);
        }
        let total = count_query.fetch_one(self.pool()).await?;

        // NULL names sort last.
        let sql = format!(
            "{SUMMARY_SELECT} WHERE {where_clause} ORDER BY name IS NULL, name ASC, id ASC LIMIT ? OFFSET ?"
        );
        let mut query = sqlx::query_as::<_, PersonalDetailsSummary>(&sql);
        for value in &bind_values {
            query = query.bind(value);
        }
        let rows = query
            .bind(i64::from(filters.limit()))
            .bind(filters.offset() as i64)
            .fetch_all(self.pool())
            .await?;

        Ok((rows, total))
    }

    /// Update columns of the row with primary key `id`. Returns the updated
    /// rows, empty when no visible row matches.
    #[instrument(skip(self, assignments))]
    pub async fn update_personal_details(
        &self,
        id: &str,
        assignments: &[(&'static str, String)],
    ) -> StoreResult<Vec<PersonalDetails>> {
        let scope = self.owned_rows();

        if !assignments.is_empty() {
            let set_clause = assignments
                .iter()
                .map(|(column, _)| format!("{column} = ?"))
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!(
                "UPDATE personal_details SET {set_clause}, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ? AND {}",
                scope.predicate("user_id")
            );

            let mut query = sqlx::query(&sql);
            for (_, value) in assignments {
                query = query.bind(value);
            }
            query = query.bind(id);
            if let Some(owner) = scope.owner() {
                query = query.bind(owner);
            }

            let updated = query.execute(self.pool()).await?.rows_affected();
            debug!("updated {} personal details row(s) with id {}", updated, id);
        }

        let sql = format!(
            "{DETAILS_SELECT} WHERE id = ? AND {}",
            scope.predicate("user_id")
        );
        let mut query = sqlx::query_as::<_, PersonalDetails>(&sql).bind(id);
        if let Some(owner) = scope.owner() {
            query = query.bind(owner);
        }

        Ok(query.fetch_all(self.pool()).await?)
    }
}

fn escape_like(term: &str) -> String {
    term.replace('\\', r"\\")
        .replace('%', r"\%")
        .replace('_', r"\_")
}
