//! User data models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User role enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// Role value outside the recognized set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid role: {0}")]
pub struct InvalidRole(pub String);

impl std::str::FromStr for Role {
    type Err = InvalidRole;

    /// Accepts exactly `admin` and `user`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(InvalidRole(s.to_string())),
        }
    }
}

impl Role {
    /// Decode a stored value. Older rows use `member` for regular users.
    pub fn from_stored(s: &str) -> Result<Self, InvalidRole> {
        match s {
            "member" => Ok(Role::User),
            other => other.parse(),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = InvalidRole;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Role::from_stored(&s)
    }
}

impl sqlx::Type<sqlx::Sqlite> for Role {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <String as sqlx::Type<sqlx::Sqlite>>::type_info()
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for Role {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Sqlite as sqlx::Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Sqlite>>::encode(self.to_string(), buf)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for Role {
    fn decode(
        value: <sqlx::Sqlite as sqlx::Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        Ok(Role::from_stored(&s)?)
    }
}

/// A user known to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserRecord {
    pub user_id: String,
    pub email: String,
    pub role: Role,
    pub created_at: String,
}

/// Result of registering a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Created(UserRecord),
    Existing(UserRecord),
}

impl Registration {
    pub fn record(&self) -> &UserRecord {
        match self {
            Registration::Created(record) | Registration::Existing(record) => record,
        }
    }

    pub fn into_record(self) -> UserRecord {
        match self {
            Registration::Created(record) | Registration::Existing(record) => record,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Registration::Created(_))
    }
}

/// Body of `POST /api/users/register`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    /// Requested role. Only the regular user role may be self-assigned.
    #[serde(default)]
    pub role: Option<String>,
}

/// Body of `PUT /api/admin/users/{id}/role`.
///
/// `role` is kept as raw JSON so that numbers, arrays and the like are
/// reported as an invalid role rather than a malformed body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Option<serde_json::Value>,
}

impl UpdateRoleRequest {
    pub fn requested_role(&self) -> Result<Role, InvalidRole> {
        match &self.role {
            Some(serde_json::Value::String(role)) => role.parse(),
            Some(other) => Err(InvalidRole(other.to_string())),
            None => Err(InvalidRole(String::new())),
        }
    }
}

/// Response of `GET /api/users/me`.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub role: Role,
    pub email: String,
}

impl From<UserRecord> for UserInfo {
    fn from(record: UserRecord) -> Self {
        Self {
            role: record.role,
            email: record.email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_is_closed() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        for bad in ["Admin", "member", "superuser", "", " admin"] {
            assert_eq!(bad.parse::<Role>(), Err(InvalidRole(bad.to_string())));
        }
    }

    #[test]
    fn test_stored_member_reads_as_user() {
        assert_eq!(Role::from_stored("member").unwrap(), Role::User);
        assert_eq!(Role::try_from("admin".to_string()).unwrap(), Role::Admin);
        assert!(Role::from_stored("owner").is_err());
    }

    #[test]
    fn test_requested_role_accepts_only_role_strings() {
        let request: UpdateRoleRequest = serde_json::from_str(r#"{"role":"admin"}"#).unwrap();
        assert_eq!(request.requested_role().unwrap(), Role::Admin);

        for body in [r#"{"role":1}"#, r#"{"role":["admin"]}"#, r#"{"role":true}"#, "{}"] {
            let request: UpdateRoleRequest = serde_json::from_str(body).unwrap();
            assert!(request.requested_role().is_err(), "{body} should be rejected");
        }
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(Role::User.to_string(), "user");
    }
}
