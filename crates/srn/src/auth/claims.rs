//! JWT claims and the identity extracted from them.

use serde::{Deserialize, Serialize};

/// JWT claims structure.
///
/// Matches the tokens issued by the identity provider: `sub` is the stable
/// user id, `email` the address the user signed in with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: String,

    /// User's email.
    pub email: String,

    /// Expiration time (as Unix timestamp).
    pub exp: i64,

    /// Issued at (as Unix timestamp).
    #[serde(default)]
    pub iat: Option<i64>,
}

impl Claims {
    pub fn identity(&self) -> Identity {
        Identity {
            subject_id: self.sub.clone(),
            email: self.email.clone(),
        }
    }
}

/// Identity of a verified caller. Lives for one request only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub subject_id: String,
    pub email: String,
}

impl Identity {
    pub fn new(subject_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            email: email.into(),
        }
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}>", self.subject_id, self.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_deserialize_without_iat() {
        let claims: Claims = serde_json::from_value(serde_json::json!({
            "sub": "7d1f",
            "email": "a@example.com",
            "exp": 42,
        }))
        .unwrap();

        assert_eq!(claims.iat, None);
        assert_eq!(claims.identity(), Identity::new("7d1f", "a@example.com"));
    }

    #[test]
    fn test_claims_require_email() {
        let result: Result<Claims, _> = serde_json::from_value(serde_json::json!({
            "sub": "7d1f",
            "exp": 42,
        }));
        assert!(result.is_err());
    }
}
