use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use service::review::{self, ReviewView};

use crate::errors::ApiError;
use crate::routes::auth::{CurrentUser, ServerState};

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    #[serde(rename = "coffeeBeanId")]
    pub coffee_bean_id: Uuid,
    pub rating: i16,
    #[serde(default)]
    pub comment: Option<String>,
}

#[utoipa::path(get, path = "/beans/{id}/reviews", tag = "reviews",
    params(("id" = Uuid, Path, description = "Coffee bean id")),
    responses((status = 200, description = "Reviews with reviewer names"),
              (status = 404, description = "Coffee bean does not exist")))]
pub async fn list(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ReviewView>>, ApiError> {
    let views = review::list_reviews(&state.db, &state.cipher, id).await?;
    Ok(Json(views))
}

#[utoipa::path(post, path = "/reviews/create", tag = "reviews", request_body = crate::openapi::ReviewRequestDoc,
    responses((status = 200, description = "Created review"),
              (status = 404, description = "Coffee bean does not exist"),
              (status = 409, description = "Already reviewed")))]
pub async fn create(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<ReviewRequest>,
) -> Result<Json<ReviewView>, ApiError> {
    let view = review::create_review(
        &state.db,
        &state.cipher,
        current.user_id,
        req.coffee_bean_id,
        req.rating,
        req.comment,
    )
    .await?;
    Ok(Json(view))
}

#[utoipa::path(post, path = "/reviews/update", tag = "reviews", request_body = crate::openapi::ReviewRequestDoc,
    responses((status = 200, description = "Updated review"),
              (status = 404, description = "Review does not exist")))]
pub async fn update(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<ReviewRequest>,
) -> Result<Json<ReviewView>, ApiError> {
    let view = review::update_review(
        &state.db,
        &state.cipher,
        current.user_id,
        req.coffee_bean_id,
        req.rating,
        req.comment,
    )
    .await?;
    Ok(Json(view))
}

#[utoipa::path(delete, path = "/reviews/{id}", tag = "reviews",
    params(("id" = Uuid, Path, description = "Coffee bean id the review belongs to")),
    responses((status = 204, description = "Deleted"),
              (status = 404, description = "Review does not exist")))]
pub async fn remove(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    review::delete_review(&state.db, current.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
