pub mod account;
pub mod auth;
pub mod beans;
pub mod reviews;
pub mod shop;

use axum::{
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::routes::auth::ServerState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "Service is up")))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: public routes, bearer-guarded routes,
/// and the Swagger UI.
pub fn build_router(cors: CorsLayer, state: ServerState) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/auth/signup", post(auth::sign_up))
        .route("/auth/signin", post(auth::sign_in))
        .route("/beans/:id/details", get(beans::details))
        .route("/beans/:id/reviews", get(reviews::list));

    let protected = Router::new()
        .route("/account/me", get(account::me))
        .route("/account/update", post(account::update))
        .route("/account/change-password", post(account::change_password))
        .route("/shop", get(shop::details))
        .route("/shop/update", post(shop::update))
        .route("/beans", get(beans::list))
        .route("/beans/create", post(beans::create))
        .route("/beans/update", post(beans::update))
        .route("/beans/:id", delete(beans::remove))
        .route("/reviews/create", post(reviews::create))
        .route("/reviews/update", post(reviews::update))
        .route("/reviews/:id", delete(reviews::remove))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_auth));

    public
        .merge(protected)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", crate::openapi::ApiDoc::openapi()))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
