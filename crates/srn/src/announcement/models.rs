//! Announcement data models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A published announcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Announcement {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_email: String,
    pub author_id: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl Announcement {
    /// Whether `email` wrote this announcement.
    pub fn is_authored_by(&self, email: &str) -> bool {
        self.author_email == email
    }
}

/// Body of announcement create and update requests.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnnouncementRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl AnnouncementRequest {
    /// Title and content, when both are present and non-empty.
    pub fn fields(&self) -> Option<(&str, &str)> {
        let title = self.title.as_deref().filter(|t| !t.is_empty())?;
        let content = self.content.as_deref().filter(|c| !c.is_empty())?;
        Some((title, content))
    }
}
