//! Request body extractors.

use axum::extract::FromRequest;

use super::error::ApiError;

/// JSON body whose rejections (missing content type, malformed or
/// mistyped JSON) are reported as [`ApiError::BadRequest`].
#[derive(Debug, Clone, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
