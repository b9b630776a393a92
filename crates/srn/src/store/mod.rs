//! Identity store gateway.
//!
//! All table access goes through a [`StoreHandle`] obtained from one of the
//! three [`Store`] factories. The handle's [`Access`] mode decides which rows
//! a query may see or touch:
//!
//! | table              | scoped                        | elevated | anonymous |
//! |--------------------|-------------------------------|----------|-----------|
//! | `users`            | own row                       | all      | none      |
//! | `personal_details` | own row                       | all      | none      |
//! | `announcements`    | read all, write own           | all      | read all  |
//!
//! Repositories for each table are `impl StoreHandle` blocks in their domain
//! module and build their `WHERE` clauses from [`RowScope`].

use sqlx::SqlitePool;
use thiserror::Error;

use crate::auth::Identity;

/// Store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The handle may not write this row.
    #[error("row restricted: {0}")]
    Restricted(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// How a handle is allowed to access rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Anonymous,
    Scoped(Identity),
    Elevated,
}

/// Entry point to the database. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Handle restricted to the rows owned by `identity`.
    pub fn scoped(&self, identity: &Identity) -> StoreHandle {
        self.handle(Access::Scoped(identity.clone()))
    }

    /// Handle for requests without an identity. Reads public rows only.
    pub fn anonymous(&self) -> StoreHandle {
        self.handle(Access::Anonymous)
    }

    /// Handle that bypasses row restrictions.
    ///
    /// Only role resolution and admin-admitted handlers construct one.
    pub(crate) fn elevated(&self) -> StoreHandle {
        self.handle(Access::Elevated)
    }

    fn handle(&self, access: Access) -> StoreHandle {
        StoreHandle {
            pool: self.pool.clone(),
            access,
        }
    }
}

/// A view of the store with a fixed access mode.
#[derive(Debug, Clone)]
pub struct StoreHandle {
    pool: SqlitePool,
    access: Access,
}

impl StoreHandle {
    pub fn access(&self) -> &Access {
        &self.access
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Rows of an owner-keyed table this handle may read or write.
    pub(crate) fn owned_rows(&self) -> RowScope<'_> {
        match &self.access {
            Access::Elevated => RowScope::All,
            Access::Scoped(identity) => RowScope::Owner(&identity.subject_id),
            Access::Anonymous => RowScope::Nothing,
        }
    }

    /// Rows of a publicly readable table this handle may read.
    pub(crate) fn public_rows(&self) -> RowScope<'_> {
        RowScope::All
    }

    /// Fail with [`StoreError::Restricted`] unless this handle may write rows
    /// owned by `owner_id`.
    pub(crate) fn ensure_writable(&self, table: &str, owner_id: &str) -> StoreResult<()> {
        if self.owned_rows().permits(owner_id) {
            Ok(())
        } else {
            Err(StoreError::Restricted(format!(
                "{table}: cannot write rows owned by {owner_id}"
            )))
        }
    }
}

/// Row filter derived from an access mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RowScope<'a> {
    All,
    Owner(&'a str),
    Nothing,
}

impl<'a> RowScope<'a> {
    /// SQL predicate on `column`. Bind [`RowScope::owner`] after the
    /// preceding parameters when it is `Some`.
    pub(crate) fn predicate(&self, column: &str) -> String {
        match self {
            RowScope::All => "1 = 1".to_string(),
            RowScope::Owner(_) => format!("{column} = ?"),
            RowScope::Nothing => "1 = 0".to_string(),
        }
    }

    pub(crate) fn owner(&self) -> Option<&'a str> {
        match self {
            RowScope::Owner(owner) => Some(owner),
            _ => None,
        }
    }

    pub(crate) fn permits(&self, owner_id: &str) -> bool {
        match self {
            RowScope::All => true,
            RowScope::Owner(owner) => *owner == owner_id,
            RowScope::Nothing => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    #[tokio::test]
    async fn test_factories_set_access_mode() {
        let db = Database::in_memory().await.unwrap();
        let store = Store::new(db.pool().clone());
        let alice = Identity::new("alice", "alice@example.com");

        assert_eq!(store.anonymous().access(), &Access::Anonymous);
        assert_eq!(store.elevated().access(), &Access::Elevated);
        assert_eq!(
            store.scoped(&alice).access(),
            &Access::Scoped(alice.clone())
        );
    }

    #[tokio::test]
    async fn test_owned_rows_follow_access() {
        let db = Database::in_memory().await.unwrap();
        let store = Store::new(db.pool().clone());
        let alice = Identity::new("alice", "alice@example.com");

        let scoped = store.scoped(&alice);
        assert_eq!(scoped.owned_rows(), RowScope::Owner("alice"));
        assert!(scoped.ensure_writable("users", "alice").is_ok());
        assert!(matches!(
            scoped.ensure_writable("users", "bob"),
            Err(StoreError::Restricted(_))
        ));

        assert!(store.elevated().ensure_writable("users", "bob").is_ok());
        assert!(store.anonymous().ensure_writable("users", "bob").is_err());
    }

    #[test]
    fn test_predicates() {
        assert_eq!(RowScope::All.predicate("user_id"), "1 = 1");
        assert_eq!(RowScope::Owner("a").predicate("user_id"), "user_id = ?");
        assert_eq!(RowScope::Owner("a").owner(), Some("a"));
        assert_eq!(RowScope::Nothing.predicate("user_id"), "1 = 0");
        assert_eq!(RowScope::Nothing.owner(), None);
    }
}
