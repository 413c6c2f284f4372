use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(ToSchema, serde::Deserialize)]
pub struct AddressDoc {
    pub street: String,
    pub city: String,
    pub province: String,
}

#[derive(ToSchema, serde::Deserialize)]
pub struct GeoPointDoc {
    pub lat: f64,
    pub lng: f64,
}

#[derive(ToSchema, serde::Deserialize)]
pub struct ShopInputDoc {
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub image: Option<String>,
    pub location: GeoPointDoc,
    #[serde(rename = "deliveryRange")]
    pub delivery_range: Option<f64>,
}

#[derive(ToSchema, serde::Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    #[serde(rename = "userType")]
    pub user_type: i16,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub address: AddressDoc,
    pub shop: Option<ShopInputDoc>,
}

#[derive(ToSchema, serde::Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(ToSchema, serde::Deserialize)]
pub struct ProfileUpdateRequest {
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName")]
    pub last_name: Option<String>,
    pub address: Option<AddressDoc>,
}

#[derive(ToSchema, serde::Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(rename = "oldPassword")]
    pub old_password: String,
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

#[derive(ToSchema, serde::Deserialize)]
pub struct ShopUpdateRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub location: GeoPointDoc,
}

#[derive(ToSchema, serde::Deserialize)]
pub struct BeanCreateRequest {
    pub name: String,
    pub description: Option<String>,
    pub species: String,
    pub origin: String,
    #[serde(rename = "roastingLevel")]
    pub roasting_level: String,
    pub price: f64,
}

#[derive(ToSchema, serde::Deserialize)]
pub struct BeanUpdateRequest {
    #[serde(rename = "coffeeBeanId")]
    pub coffee_bean_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub species: String,
    pub origin: String,
    #[serde(rename = "roastingLevel")]
    pub roasting_level: String,
    pub price: f64,
}

#[derive(ToSchema, serde::Deserialize)]
pub struct ReviewRequestDoc {
    #[serde(rename = "coffeeBeanId")]
    pub coffee_bean_id: Uuid,
    pub rating: i16,
    pub comment: Option<String>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::sign_up,
        crate::routes::auth::sign_in,
        crate::routes::account::me,
        crate::routes::account::update,
        crate::routes::account::change_password,
        crate::routes::shop::details,
        crate::routes::shop::update,
        crate::routes::beans::list,
        crate::routes::beans::create,
        crate::routes::beans::update,
        crate::routes::beans::remove,
        crate::routes::beans::details,
        crate::routes::reviews::list,
        crate::routes::reviews::create,
        crate::routes::reviews::update,
        crate::routes::reviews::remove,
    ),
    components(
        schemas(
            HealthResponse,
            AddressDoc,
            GeoPointDoc,
            ShopInputDoc,
            SignUpRequest,
            SignInRequest,
            ProfileUpdateRequest,
            ChangePasswordRequest,
            ShopUpdateRequest,
            BeanCreateRequest,
            BeanUpdateRequest,
            ReviewRequestDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "account"),
        (name = "shop"),
        (name = "beans"),
        (name = "reviews")
    )
)]
pub struct ApiDoc;
