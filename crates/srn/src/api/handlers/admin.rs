//! Admin-only handlers.
//!
//! Every handler here is admitted by [`RequireAdmin`] before it touches the
//! store, and then works across all users through the elevated handle.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Serialize;
use tracing::{info, instrument};

use crate::auth::RequireAdmin;
use crate::profile::{EditUserRequest, PersonalDetails, PersonalDetailsQuery, PersonalDetailsSummary};
use crate::user::{InvalidRole, Role, UpdateRoleRequest, UserRecord};

use super::MessageResponse;
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::ApiJson;
use crate::api::state::AppState;

/// Change the role of user `id`.
#[instrument(skip(state, admin, request), fields(admin = %admin.subject_id))]
pub async fn update_user_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
    request: Result<ApiJson<UpdateRoleRequest>, ApiError>,
) -> ApiResult<Json<MessageResponse<UserRecord>>> {
    // An unreadable body carries no valid role either.
    let role: Role = match request {
        Ok(ApiJson(request)) => request.requested_role()?,
        Err(_) => return Err(InvalidRole(String::new()).into()),
    };

    let record = state
        .store
        .elevated()
        .set_role(&id, role)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    info!(user_id = %id, role = %role, "Admin updated user role");
    Ok(Json(MessageResponse::new(
        "Role updated successfully",
        record,
    )))
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub data: Vec<PersonalDetailsSummary>,
    pub total: i64,
}

/// Filtered, paginated listing of personal details.
#[instrument(skip(state, _admin))]
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<PersonalDetailsQuery>,
) -> ApiResult<Json<UserListResponse>> {
    let (data, total) = state
        .store
        .elevated()
        .search_personal_details(&query)
        .await?;

    Ok(Json(UserListResponse { data, total }))
}

#[derive(Debug, Serialize)]
pub struct AdminPersonalDetailsResponse {
    pub success: bool,
    pub data: Vec<PersonalDetails>,
}

/// Every personal details row, newest first.
#[instrument(skip(state, _admin))]
pub async fn list_personal_details(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> ApiResult<Json<AdminPersonalDetailsResponse>> {
    let rows = state.store.elevated().list_personal_details().await?;

    Ok(Json(AdminPersonalDetailsResponse {
        success: true,
        data: rows.into_iter().map(PersonalDetails::for_display).collect(),
    }))
}

/// Update fields of one personal details row.
#[instrument(skip(state, admin, request), fields(admin = %admin.subject_id))]
pub async fn edit_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(request): ApiJson<EditUserRequest>,
) -> ApiResult<Json<MessageResponse<Vec<PersonalDetails>>>> {
    let id = request
        .id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::bad_request("User ID is required"))?;

    let assignments = request.assignments();
    if assignments.is_empty() {
        return Err(ApiError::validation("No fields to update"));
    }

    let rows = state
        .store
        .elevated()
        .update_personal_details(id, &assignments)
        .await?;

    info!(id = %id, fields = assignments.len(), "Admin edited personal details");
    Ok(Json(MessageResponse::new(
        "User updated successfully",
        rows.into_iter().map(PersonalDetails::for_display).collect(),
    )))
}
