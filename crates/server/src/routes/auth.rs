use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
    Json,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use uuid::Uuid;

use common::crypto::FieldCipher;
use service::identity::domain::{Session, SignInInput, SignUpInput};
use service::identity::repo::seaorm::SeaOrmIdentityRepository;
use service::identity::service::{IdentityConfig, IdentityService};

use crate::errors::ApiError;

#[derive(Clone)]
pub struct ServerAuthConfig {
    pub jwt_secret: String,
}

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: ServerAuthConfig,
    pub cipher: FieldCipher,
}

/// Authenticated caller, injected as a request extension by [`require_auth`].
#[derive(Clone, Copy, Debug)]
pub struct CurrentUser {
    pub user_id: Uuid,
    pub user_type: i16,
}

/// Assemble an identity service over the live database.
pub(crate) fn identity(state: &ServerState) -> IdentityService<SeaOrmIdentityRepository> {
    IdentityService::new(
        Arc::new(SeaOrmIdentityRepository { db: state.db.clone() }),
        state.cipher.clone(),
        IdentityConfig {
            jwt_secret: state.auth.jwt_secret.clone(),
            password_algorithm: "argon2".into(),
        },
    )
}

#[utoipa::path(post, path = "/auth/signup", tag = "auth", request_body = crate::openapi::SignUpRequest,
    responses((status = 200, description = "Account created, session returned"),
              (status = 400, description = "Bad Request"),
              (status = 409, description = "Email already in use")))]
pub async fn sign_up(
    State(state): State<ServerState>,
    Json(input): Json<SignUpInput>,
) -> Result<Json<Session>, ApiError> {
    let session = identity(&state).sign_up(input).await?;
    Ok(Json(session))
}

#[utoipa::path(post, path = "/auth/signin", tag = "auth", request_body = crate::openapi::SignInRequest,
    responses((status = 200, description = "Session returned"),
              (status = 401, description = "Email or password is incorrect")))]
pub async fn sign_in(
    State(state): State<ServerState>,
    Json(input): Json<SignInInput>,
) -> Result<Json<Session>, ApiError> {
    let session = identity(&state).sign_in(input).await?;
    Ok(Json(session))
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[allow(dead_code)]
    exp: usize,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Route-layer guard for everything behind a login.
///
/// Decodes the bearer token, loads the subject user, and injects
/// [`CurrentUser`]. Any failure collapses to a plain 401.
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())
        .map(str::to_owned)
        .ok_or_else(ApiError::unauthorized)?;

    let key = DecodingKey::from_secret(state.auth.jwt_secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let data = decode::<Claims>(&token, &key, &validation).map_err(|e| {
        tracing::warn!(path = %req.uri().path(), err = %e, "token validation failed");
        ApiError::unauthorized()
    })?;
    let user_id = Uuid::parse_str(&data.claims.sub).map_err(|_| ApiError::unauthorized())?;

    let user = models::user::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(ApiError::unauthorized)?;

    req.extensions_mut().insert(CurrentUser { user_id: user.id, user_type: user.user_type });
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::AUTHORIZATION;

    #[test]
    fn bearer_token_requires_prefix() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));

        headers.insert(AUTHORIZATION, "Basic dXNlcg==".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);

        headers.remove(AUTHORIZATION);
        assert_eq!(bearer_token(&headers), None);
    }
}
