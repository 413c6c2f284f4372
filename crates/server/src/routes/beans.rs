use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use service::catalog::{self, BeanInput};

use crate::errors::ApiError;
use crate::routes::auth::{CurrentUser, ServerState};

#[utoipa::path(get, path = "/beans", tag = "beans",
    responses((status = 200, description = "Listings of the caller's shop"),
              (status = 404, description = "Shop not found")))]
pub async fn list(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<models::coffee_bean::Model>>, ApiError> {
    let beans = catalog::list_beans(&state.db, current.user_id).await?;
    Ok(Json(beans))
}

#[utoipa::path(post, path = "/beans/create", tag = "beans", request_body = crate::openapi::BeanCreateRequest,
    responses((status = 200, description = "Created listing"),
              (status = 404, description = "Shop not found")))]
pub async fn create(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Json(input): Json<BeanInput>,
) -> Result<Json<models::coffee_bean::Model>, ApiError> {
    let bean = catalog::create_bean(&state.db, current.user_id, input).await?;
    Ok(Json(bean))
}

#[derive(Debug, Deserialize)]
pub struct UpdateBeanRequest {
    #[serde(rename = "coffeeBeanId")]
    pub coffee_bean_id: Uuid,
    #[serde(flatten)]
    pub input: BeanInput,
}

#[utoipa::path(post, path = "/beans/update", tag = "beans", request_body = crate::openapi::BeanUpdateRequest,
    responses((status = 200, description = "Updated listing"),
              (status = 404, description = "Listing not found")))]
pub async fn update(
    State(state): State<ServerState>,
    Json(req): Json<UpdateBeanRequest>,
) -> Result<Json<models::coffee_bean::Model>, ApiError> {
    let bean = catalog::update_bean(&state.db, req.coffee_bean_id, req.input).await?;
    Ok(Json(bean))
}

#[utoipa::path(delete, path = "/beans/{id}", tag = "beans",
    params(("id" = Uuid, Path, description = "Coffee bean id")),
    responses((status = 204, description = "Deleted"),
              (status = 401, description = "Not the owning vendor"),
              (status = 404, description = "Listing not found")))]
pub async fn remove(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    catalog::delete_bean(&state.db, current.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/beans/{id}/details", tag = "beans",
    params(("id" = Uuid, Path, description = "Coffee bean id")),
    responses((status = 200, description = "Public listing details"),
              (status = 404, description = "Listing not found")))]
pub async fn details(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<models::coffee_bean::Model>, ApiError> {
    let bean = catalog::bean_details(&state.db, id).await?;
    Ok(Json(bean))
}
