//! Banner, health check and role check.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use crate::auth::Authenticated;
use crate::user::Role;

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;

/// Plain-text banner at `/`.
pub async fn root() -> &'static str {
    "SRN Project Backend is running"
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub role: Role,
}

/// Stored role of the caller.
#[instrument(skip(state, identity), fields(user_id = %identity.subject_id))]
pub async fn check_role(
    State(state): State<AppState>,
    Authenticated(identity): Authenticated,
) -> ApiResult<Json<RoleResponse>> {
    // The caller may not be able to read their own row through a scoped
    // handle before registration completes.
    let role = state
        .store
        .elevated()
        .find_role(&identity)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(RoleResponse { role }))
}
