//! Announcement handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use tracing::{info, instrument};

use crate::announcement::{Announcement, AnnouncementRequest};
use crate::auth::{Identity, RequireAdmin};
use crate::store::StoreHandle;

use super::MessageResponse;
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::ApiJson;
use crate::api::state::AppState;

const FIELDS_REQUIRED: &str = "Title and content are required";

/// All announcements, newest first. Public.
#[instrument(skip(state))]
pub async fn list_announcements(State(state): State<AppState>) -> ApiResult<Json<Vec<Announcement>>> {
    let announcements = state.store.anonymous().list_announcements().await?;
    Ok(Json(announcements))
}

/// Publish an announcement authored by the caller.
#[instrument(skip(state, admin, request), fields(admin = %admin.subject_id))]
pub async fn create_announcement(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(request): ApiJson<AnnouncementRequest>,
) -> ApiResult<(StatusCode, Json<MessageResponse<Announcement>>)> {
    let (title, content) = request
        .fields()
        .ok_or_else(|| ApiError::validation(FIELDS_REQUIRED))?;

    let announcement = state
        .store
        .scoped(&admin)
        .create_announcement(&admin, title, content)
        .await?;

    info!(id = announcement.id, "Announcement created");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(
            "Announcement created successfully",
            announcement,
        )),
    ))
}

/// Load announcement `id` and check that `caller` wrote it.
///
/// Admin privilege alone does not grant access to other admins'
/// announcements.
async fn authored_announcement(
    handle: &StoreHandle,
    id: i64,
    caller: &Identity,
    action: &str,
) -> ApiResult<Announcement> {
    let announcement = handle
        .get_announcement(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Announcement not found"))?;

    if !announcement.is_authored_by(&caller.email) {
        return Err(ApiError::forbidden(format!(
            "You can only {action} your own announcements"
        )));
    }

    Ok(announcement)
}

/// Replace title and content of one of the caller's announcements.
#[instrument(skip(state, admin, request), fields(admin = %admin.subject_id))]
pub async fn update_announcement(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<AnnouncementRequest>,
) -> ApiResult<Json<MessageResponse<Announcement>>> {
    let (title, content) = request
        .fields()
        .ok_or_else(|| ApiError::validation(FIELDS_REQUIRED))?;

    let handle = state.store.scoped(&admin);
    authored_announcement(&handle, id, &admin, "update").await?;

    let announcement = handle
        .update_announcement(id, title, content)
        .await?
        .ok_or_else(|| ApiError::forbidden("You can only update your own announcements"))?;

    info!(id, "Announcement updated");
    Ok(Json(MessageResponse::new(
        "Announcement updated successfully",
        announcement,
    )))
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: &'static str,
}

/// Delete one of the caller's announcements.
#[instrument(skip(state, admin), fields(admin = %admin.subject_id))]
pub async fn delete_announcement(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i64>,
) -> ApiResult<Json<DeleteResponse>> {
    let handle = state.store.scoped(&admin);
    authored_announcement(&handle, id, &admin, "delete").await?;

    if !handle.delete_announcement(id).await? {
        return Err(ApiError::forbidden(
            "You can only delete your own announcements",
        ));
    }

    info!(id, "Announcement deleted");
    Ok(Json(DeleteResponse {
        message: "Announcement deleted successfully",
    }))
}
