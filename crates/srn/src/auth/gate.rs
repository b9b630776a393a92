//! Request admission: token verification followed by an optional role check.
//!
//! Every protected request passes through [`AuthorizationGate::admit`]. The
//! decision is computed from the token and a fresh role lookup on each call;
//! nothing is cached between requests, so a revoked admin is refused on the
//! very next request.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION, request::Parts},
};
use log::debug;

use super::{AuthError, CredentialVerifier, Identity};
use crate::store::Store;
use crate::user::Role;

/// What a route demands from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    None,
    Authenticated,
    Admin,
}

/// Privilege level derived for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Privilege {
    Anonymous,
    Authenticated(Identity),
    Admin(Identity),
}

impl Privilege {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Privilege::Anonymous => None,
            Privilege::Authenticated(identity) | Privilege::Admin(identity) => Some(identity),
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Privilege::Admin(_))
    }
}

/// Outcome of the gate for one request.
#[derive(Debug)]
pub enum Admission {
    Admitted(Privilege),
    Rejected { status: StatusCode, kind: AuthError },
}

impl Admission {
    fn from_result(result: Result<Privilege, AuthError>) -> Self {
        match result {
            Ok(privilege) => Admission::Admitted(privilege),
            Err(kind) => Admission::Rejected {
                status: kind.status_code(),
                kind,
            },
        }
    }

    pub fn into_result(self) -> Result<Privilege, AuthError> {
        match self {
            Admission::Admitted(privilege) => Ok(privilege),
            Admission::Rejected { kind, .. } => Err(kind),
        }
    }
}

/// Composes the credential verifier with the identity store.
#[derive(Debug, Clone)]
pub struct AuthorizationGate {
    verifier: CredentialVerifier,
    store: Store,
}

impl AuthorizationGate {
    pub fn new(verifier: CredentialVerifier, store: Store) -> Self {
        Self { verifier, store }
    }

    pub fn verifier(&self) -> &CredentialVerifier {
        &self.verifier
    }

    /// Decide whether a request carrying `raw_token` may proceed.
    pub async fn admit(&self, raw_token: Option<&str>, requirement: Requirement) -> Admission {
        Admission::from_result(self.evaluate(raw_token, requirement).await)
    }

    async fn evaluate(
        &self,
        raw_token: Option<&str>,
        requirement: Requirement,
    ) -> Result<Privilege, AuthError> {
        if requirement == Requirement::None {
            return Ok(Privilege::Anonymous);
        }

        let token = raw_token.ok_or(AuthError::MissingToken)?;
        let identity = self.verifier.verify(token)?;

        if requirement == Requirement::Authenticated {
            return Ok(Privilege::Authenticated(identity));
        }

        // Role resolution reads the caller's own record, which is the one
        // place the gate bypasses row restrictions.
        match self.store.elevated().find_role(&identity).await {
            Ok(Some(Role::Admin)) => {
                debug!("admin access granted for {}", identity.subject_id);
                Ok(Privilege::Admin(identity))
            }
            Ok(_) => Err(AuthError::AdminRequired),
            Err(e) => Err(AuthError::Store(e.to_string())),
        }
    }
}

/// Extract a Bearer token from an Authorization header value.
fn bearer_token_from_header(header_value: &str) -> Result<&str, AuthError> {
    let mut parts = header_value.split_whitespace();
    let scheme = parts.next().ok_or(AuthError::InvalidAuthHeader)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidAuthHeader);
    }

    let token = parts.next().ok_or(AuthError::InvalidAuthHeader)?;
    if parts.next().is_some() {
        return Err(AuthError::InvalidAuthHeader);
    }

    Ok(token)
}

/// Bearer token from request headers. `Ok(None)` when no header is sent.
pub fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    match headers.get(AUTHORIZATION) {
        None => Ok(None),
        Some(value) => {
            let value = value.to_str().map_err(|_| AuthError::InvalidAuthHeader)?;
            bearer_token_from_header(value).map(Some)
        }
    }
}

async fn admit_parts<S>(
    parts: &Parts,
    state: &S,
    requirement: Requirement,
) -> Result<Privilege, AuthError>
where
    AuthorizationGate: FromRef<S>,
{
    let gate = AuthorizationGate::from_ref(state);
    let token = bearer_token(&parts.headers)?;
    gate.admit(token, requirement).await.into_result()
}

/// Any caller with a valid token.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Identity);

impl<S> FromRequestParts<S> for Authenticated
where
    AuthorizationGate: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match admit_parts(parts, state, Requirement::Authenticated).await? {
            Privilege::Authenticated(identity) | Privilege::Admin(identity) => {
                Ok(Authenticated(identity))
            }
            Privilege::Anonymous => Err(AuthError::MissingToken),
        }
    }
}

/// Caller with a valid token whose stored role is admin.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub Identity);

impl<S> FromRequestParts<S> for RequireAdmin
where
    AuthorizationGate: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match admit_parts(parts, state, Requirement::Admin).await? {
            Privilege::Admin(identity) => Ok(RequireAdmin(identity)),
            _ => Err(AuthError::AdminRequired),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use std::time::Duration;

    const SECRET: &str = "test-secret-for-unit-tests-minimum-32-chars-long";

    async fn gate() -> (AuthorizationGate, Database) {
        let db = Database::in_memory().await.unwrap();
        let store = Store::new(db.pool().clone());
        (
            AuthorizationGate::new(CredentialVerifier::new(SECRET), store),
            db,
        )
    }

    fn token_for(gate: &AuthorizationGate, identity: &Identity) -> String {
        gate.verifier()
            .issue(identity, Duration::from_secs(600))
            .unwrap()
    }

    #[test]
    fn test_bearer_token_from_header_valid() {
        assert_eq!(
            bearer_token_from_header("Bearer abc.def.ghi").unwrap(),
            "abc.def.ghi"
        );
        assert_eq!(
            bearer_token_from_header("bearer   token123").unwrap(),
            "token123"
        );
    }

    #[test]
    fn test_bearer_token_from_header_invalid() {
        for case in ["", "Bearer", "Bearer ", "Token something", "Bearer a b"] {
            assert!(
                bearer_token_from_header(case).is_err(),
                "{case} should fail"
            );
        }
    }

    #[tokio::test]
    async fn test_no_requirement_is_anonymous() {
        let (gate, _db) = gate().await;
        let admission = gate.admit(Some("garbage"), Requirement::None).await;
        assert!(matches!(
            admission,
            Admission::Admitted(Privilege::Anonymous)
        ));
    }

    #[tokio::test]
    async fn test_missing_token_rejected_with_401() {
        let (gate, _db) = gate().await;
        for requirement in [Requirement::Authenticated, Requirement::Admin] {
            match gate.admit(None, requirement).await {
                Admission::Rejected { status, kind } => {
                    assert_eq!(status, StatusCode::UNAUTHORIZED);
                    assert!(matches!(kind, AuthError::MissingToken));
                }
                other => panic!("expected rejection, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_invalid_token_rejected_before_store() {
        let (gate, db) = gate().await;
        // Any store access would now fail with a 500.
        db.pool().close().await;

        match gate.admit(Some("not.a.token"), Requirement::Admin).await {
            Admission::Rejected { status, .. } => assert_eq!(status, StatusCode::UNAUTHORIZED),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_authenticated_does_not_need_user_record() {
        let (gate, _db) = gate().await;
        let alice = Identity::new("alice", "alice@example.com");
        let token = token_for(&gate, &alice);

        let privilege = gate
            .admit(Some(&token), Requirement::Authenticated)
            .await
            .into_result()
            .unwrap();
        assert_eq!(privilege, Privilege::Authenticated(alice));
    }

    #[tokio::test]
    async fn test_admin_requires_stored_admin_role() {
        let (gate, db) = gate().await;
        let alice = Identity::new("alice", "alice@example.com");
        let token = token_for(&gate, &alice);

        // No user record at all.
        let result = gate.admit(Some(&token), Requirement::Admin).await;
        assert!(matches!(
            result,
            Admission::Rejected {
                status: StatusCode::FORBIDDEN,
                kind: AuthError::AdminRequired
            }
        ));

        let store = Store::new(db.pool().clone());
        store
            .elevated()
            .upsert_user_record(&alice.subject_id, &alice.email, Role::User)
            .await
            .unwrap();
        let result = gate.admit(Some(&token), Requirement::Admin).await;
        assert!(matches!(result, Admission::Rejected { .. }));

        store
            .elevated()
            .set_role(&alice.subject_id, Role::Admin)
            .await
            .unwrap();
        let privilege = gate
            .admit(Some(&token), Requirement::Admin)
            .await
            .into_result()
            .unwrap();
        assert!(privilege.is_admin());

        // Revocation takes effect on the next request.
        store
            .elevated()
            .set_role(&alice.subject_id, Role::User)
            .await
            .unwrap();
        let result = gate.admit(Some(&token), Requirement::Admin).await;
        assert!(matches!(
            result.into_result(),
            Err(AuthError::AdminRequired)
        ));
    }

    #[tokio::test]
    async fn test_store_failure_is_500_not_403() {
        let (gate, db) = gate().await;
        let alice = Identity::new("alice", "alice@example.com");
        let token = token_for(&gate, &alice);
        db.pool().close().await;

        match gate.admit(Some(&token), Requirement::Admin).await {
            Admission::Rejected { status, kind } => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert!(matches!(kind, AuthError::Store(_)));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }
}
