//! Registration and the caller's own user record.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
};
use tracing::{info, instrument};

use crate::auth::Authenticated;
use crate::user::{InvalidRole, RegisterRequest, Role, UserInfo, UserRecord};

use super::MessageResponse;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;

/// Role a caller may request for themselves at registration.
fn self_assignable_role(requested: Option<&str>) -> ApiResult<Role> {
    match requested {
        None | Some("user") | Some("member") => Ok(Role::User),
        Some("admin") => Err(ApiError::forbidden("Cannot self-assign the admin role")),
        Some(other) => Err(InvalidRole(other.to_string()).into()),
    }
}

/// Register the caller. Repeated calls return the existing record.
#[instrument(skip(state, identity, body), fields(user_id = %identity.subject_id))]
pub async fn register(
    State(state): State<AppState>,
    Authenticated(identity): Authenticated,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<MessageResponse<UserRecord>>)> {
    let request: RegisterRequest = if body.iter().all(u8::is_ascii_whitespace) {
        RegisterRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::bad_request(format!("Invalid request body: {e}")))?
    };
    let role = self_assignable_role(request.role.as_deref())?;

    let registration = state
        .store
        .scoped(&identity)
        .upsert_user_record(&identity.subject_id, &identity.email, role)
        .await?;

    if registration.is_created() {
        info!("registered new user");
        Ok((
            StatusCode::CREATED,
            Json(MessageResponse::new(
                "User registered",
                registration.into_record(),
            )),
        ))
    } else {
        Ok((
            StatusCode::OK,
            Json(MessageResponse::new(
                "User already registered",
                registration.into_record(),
            )),
        ))
    }
}

/// Role and email of the caller.
#[instrument(skip(state, identity), fields(user_id = %identity.subject_id))]
pub async fn me(
    State(state): State<AppState>,
    Authenticated(identity): Authenticated,
) -> ApiResult<Json<UserInfo>> {
    let record = state
        .store
        .scoped(&identity)
        .get_user(&identity.subject_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(record.into()))
}
