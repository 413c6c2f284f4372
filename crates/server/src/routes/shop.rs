use axum::{extract::State, Extension, Json};

use service::shop::ShopUpdate;

use crate::errors::ApiError;
use crate::routes::auth::{CurrentUser, ServerState};

#[utoipa::path(get, path = "/shop", tag = "shop",
    responses((status = 200, description = "The caller's shop"),
              (status = 404, description = "Shop not found")))]
pub async fn details(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<models::shop::Model>, ApiError> {
    let shop = service::shop::shop_details(&state.db, current.user_id).await?;
    Ok(Json(shop))
}

#[utoipa::path(post, path = "/shop/update", tag = "shop", request_body = crate::openapi::ShopUpdateRequest,
    responses((status = 200, description = "Updated shop"),
              (status = 404, description = "Shop not found")))]
pub async fn update(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Json(input): Json<ShopUpdate>,
) -> Result<Json<models::shop::Model>, ApiError> {
    let shop = service::shop::update_shop(&state.db, current.user_id, input).await?;
    Ok(Json(shop))
}
