//! Authentication and authorization.
//!
//! Tokens are HS256 JWTs issued by an external identity provider and
//! verified with a shared secret. Roles are not carried in the token; the
//! [`AuthorizationGate`] resolves them from the store on every request.

mod claims;
mod config;
mod error;
mod gate;
mod verifier;

pub use claims::{Claims, Identity};
pub use config::{AuthConfig, ConfigValidationError, MIN_SECRET_LEN};
pub use error::{AuthError, AuthErrorResponse};
pub use gate::{
    Admission, Authenticated, AuthorizationGate, Privilege, RequireAdmin, Requirement,
    bearer_token,
};
pub use verifier::CredentialVerifier;
