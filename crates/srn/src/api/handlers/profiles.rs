//! Personal details of the caller, plus the admin-wide listing.

use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};
use tracing::{info, instrument};

use crate::auth::{Authenticated, RequireAdmin};
use crate::profile::{PersonalDetails, PersonalDetailsInput};

use super::{DataResponse, MessageResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::ApiJson;
use crate::api::state::AppState;

/// Create or update the caller's personal details.
#[instrument(skip(state, identity, input), fields(user_id = %identity.subject_id))]
pub async fn save_personal_details(
    State(state): State<AppState>,
    Authenticated(identity): Authenticated,
    ApiJson(input): ApiJson<PersonalDetailsInput>,
) -> ApiResult<(StatusCode, Json<MessageResponse<Vec<PersonalDetails>>>)> {
    let row = state
        .store
        .scoped(&identity)
        .upsert_personal_details(&identity, &input)
        .await?;

    info!("saved personal details");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(
            "Saved successfully",
            vec![row.for_display()],
        )),
    ))
}

/// The caller's personal details, or `{}` before the first save.
#[instrument(skip(state, identity), fields(user_id = %identity.subject_id))]
pub async fn my_personal_details(
    State(state): State<AppState>,
    Authenticated(identity): Authenticated,
) -> ApiResult<Json<Value>> {
    let row = state
        .store
        .scoped(&identity)
        .get_personal_details(&identity.subject_id)
        .await?;

    match row {
        Some(row) => serde_json::to_value(row.for_display())
            .map(Json)
            .map_err(|e| ApiError::internal(e.to_string())),
        None => Ok(Json(json!({}))),
    }
}

/// Every user's personal details, newest first (admin only).
#[instrument(skip(state, _admin))]
pub async fn all_personal_details(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> ApiResult<Json<DataResponse<Vec<PersonalDetails>>>> {
    let rows = state.store.elevated().list_personal_details().await?;

    Ok(Json(DataResponse {
        data: rows.into_iter().map(PersonalDetails::for_display).collect(),
    }))
}
