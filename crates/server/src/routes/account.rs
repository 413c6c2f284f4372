use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;

use service::identity::domain::{ProfileUpdate, UserProfile};

use crate::errors::ApiError;
use crate::routes::auth::{identity, CurrentUser, ServerState};

#[utoipa::path(get, path = "/account/me", tag = "account",
    responses((status = 200, description = "Decrypted profile of the caller"),
              (status = 401, description = "Unauthorized")))]
pub async fn me(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<UserProfile>, ApiError> {
    let profile = identity(&state).me(current.user_id).await?;
    Ok(Json(profile))
}

#[utoipa::path(post, path = "/account/update", tag = "account", request_body = crate::openapi::ProfileUpdateRequest,
    responses((status = 200, description = "Updated profile"),
              (status = 401, description = "Unauthorized")))]
pub async fn update(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Json(input): Json<ProfileUpdate>,
) -> Result<Json<UserProfile>, ApiError> {
    let profile = identity(&state).update_profile(current.user_id, input).await?;
    Ok(Json(profile))
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordInput {
    #[serde(rename = "oldPassword")]
    pub old_password: String,
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

#[utoipa::path(post, path = "/account/change-password", tag = "account", request_body = crate::openapi::ChangePasswordRequest,
    responses((status = 204, description = "Password changed"),
              (status = 401, description = "Password does not match.")))]
pub async fn change_password(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Json(input): Json<ChangePasswordInput>,
) -> Result<StatusCode, ApiError> {
    identity(&state)
        .change_password(current.user_id, &input.old_password, &input.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
