//! Authentication and authorization errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Why a request was not admitted.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No bearer token on the request.
    #[error("no token provided")]
    MissingToken,

    /// Authorization header present but not `Bearer <token>`.
    #[error("invalid authorization header format")]
    InvalidAuthHeader,

    /// Malformed token or bad signature.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// Token expired.
    #[error("token expired")]
    TokenExpired,

    /// Valid identity without the admin role.
    #[error("admins only")]
    AdminRequired,

    /// The role could not be determined because the store failed.
    #[error("error checking role: {0}")]
    Store(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingToken
            | AuthError::InvalidAuthHeader
            | AuthError::InvalidToken(_)
            | AuthError::TokenExpired => StatusCode::UNAUTHORIZED,
            AuthError::AdminRequired => StatusCode::FORBIDDEN,
            AuthError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "missing_token",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::InvalidToken(_) => "invalid_token",
            AuthError::TokenExpired => "token_expired",
            AuthError::AdminRequired => "admin_required",
            AuthError::Store(_) => "store_error",
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct AuthErrorResponse {
    pub error: String,
    pub code: &'static str,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error_code = self.error_code(), message = %self, "authorization failed");
        }

        let body = Json(AuthErrorResponse {
            error: self.to_string(),
            code: self.error_code(),
        });

        (status, body).into_response()
    }
}
