//! Queries on the `announcements` table.

use chrono::{SecondsFormat, Utc};
use tracing::{debug, instrument};

use super::models::Announcement;
use crate::auth::Identity;
use crate::store::{StoreHandle, StoreResult};

const ANNOUNCEMENT_COLUMNS: &str =
    "id, title, content, author_email, author_id, created_at, updated_at";

impl StoreHandle {
    /// All announcements, newest first.
    #[instrument(skip(self))]
    pub async fn list_announcements(&self) -> StoreResult<Vec<Announcement>> {
        let sql = format!(
            "SELECT {ANNOUNCEMENT_COLUMNS} FROM announcements WHERE {} ORDER BY created_at DESC, id DESC",
            self.public_rows().predicate("author_id")
        );

        Ok(sqlx::query_as::<_, Announcement>(&sql)
            .fetch_all(self.pool())
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get_announcement(&self, id: i64) -> StoreResult<Option<Announcement>> {
        let sql = format!(
            "SELECT {ANNOUNCEMENT_COLUMNS} FROM announcements WHERE id = ? AND {}",
            self.public_rows().predicate("author_id")
        );

        Ok(sqlx::query_as::<_, Announcement>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await?)
    }

    /// Publish an announcement written by `author`.
    #[instrument(skip(self, author, content), fields(author = %author.subject_id))]
    pub async fn create_announcement(
        &self,
        author: &Identity,
        title: &str,
        content: &str,
    ) -> StoreResult<Announcement> {
        self.ensure_writable("announcements", &author.subject_id)?;

        let sql = format!(
            "INSERT INTO announcements (title, content, author_email, author_id) VALUES (?, ?, ?, ?) RETURNING {ANNOUNCEMENT_COLUMNS}"
        );
        let announcement = sqlx::query_as::<_, Announcement>(&sql)
            .bind(title)
            .bind(content)
            .bind(&author.email)
            .bind(&author.subject_id)
            .fetch_one(self.pool())
            .await?;

        debug!("created announcement {}", announcement.id);
        Ok(announcement)
    }

    /// Replace title and content. `None` when no writable row matches.
    #[instrument(skip(self, content))]
    pub async fn update_announcement(
        &self,
        id: i64,
        title: &str,
        content: &str,
    ) -> StoreResult<Option<Announcement>> {
        let scope = self.owned_rows();
        let sql = format!(
            "UPDATE announcements SET title = ?, content = ?, updated_at = ? WHERE id = ? AND {} RETURNING {ANNOUNCEMENT_COLUMNS}",
            scope.predicate("author_id")
        );

        let mut query = sqlx::query_as::<_, Announcement>(&sql)
            .bind(title)
            .bind(content)
            .bind(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
            .bind(id);
        if let Some(owner) = scope.owner() {
            query = query.bind(owner);
        }

        Ok(query.fetch_optional(self.pool()).await?)
    }

    /// Remove an announcement. Returns whether a writable row was deleted.
    #[instrument(skip(self))]
    pub async fn delete_announcement(&self, id: i64) -> StoreResult<bool> {
        let scope = self.owned_rows();
        let sql = format!(
            "DELETE FROM announcements WHERE id = ? AND {}",
            scope.predicate("author_id")
        );

        let mut query = sqlx::query(&sql).bind(id);
        if let Some(owner) = scope.owner() {
            query = query.bind(owner);
        }

        let deleted = query.execute(self.pool()).await?.rows_affected() > 0;
        if deleted {
            debug!("deleted announcement {}", id);
        }
        Ok(deleted)
    }
}
