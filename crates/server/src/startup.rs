use std::{env, net::SocketAddr};

use axum::Router;
use common::crypto::FieldCipher;
use common::utils::logging::init_logging_default;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes::{self, auth};

/// Initialize logging via shared common utils
fn init_logging() {
    init_logging_default();
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Load host/port from configs or env vars, with sensible fallbacks
fn load_bind_addr() -> anyhow::Result<SocketAddr> {
    let (host, port) = match configs::load_default() {
        Ok(cfg) => {
            let s = cfg.server;
            (s.host, s.port)
        }
        Err(_) => {
            let host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
            let port = env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(8081);
            (host, port)
        }
    };
    Ok(format!("{}:{}", host, port).parse()?)
}

fn load_auth_secrets() -> anyhow::Result<(String, String)> {
    let cfg = configs::load_default().ok();
    let jwt_secret = cfg
        .as_ref()
        .map(|c| c.auth.jwt_secret.clone())
        .filter(|s| !s.is_empty())
        .or_else(|| env::var("JWT_SECRET").ok())
        .unwrap_or_else(|| "dev-secret-change-me".to_string());
    let pii_key = cfg
        .as_ref()
        .map(|c| c.auth.pii_key.clone())
        .filter(|s| !s.is_empty())
        .or_else(|| env::var("PII_KEY").ok())
        .ok_or_else(|| anyhow::anyhow!("PII_KEY is required (base64 of a 32-byte key)"))?;
    Ok((jwt_secret, pii_key))
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let db = match configs::load_default() {
        Ok(cfg) => models::db::connect_with_config(&cfg.database).await?,
        Err(_) => models::db::connect().await?,
    };

    let (jwt_secret, pii_key) = load_auth_secrets()?;
    let cipher = FieldCipher::from_base64_key(&pii_key)?;

    let state = auth::ServerState {
        db,
        auth: auth::ServerAuthConfig { jwt_secret },
        cipher,
    };

    let app: Router = routes::build_router(build_cors(), state);

    let addr = load_bind_addr()?;
    info!(%addr, "starting coffee market api");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
