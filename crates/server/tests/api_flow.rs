use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use migration::MigratorTrait;
use serde_json::{json, Value};
use tower::Service;
use uuid::Uuid;

use common::crypto::{generate_base64_key, FieldCipher};
use server::routes::{self, auth};

fn cors() -> tower_http::cors::CorsLayer {
    tower_http::cors::CorsLayer::very_permissive()
}

async fn build_app() -> anyhow::Result<Router> {
    let db = models::db::connect().await?;
    // Re-running migrations against an already-migrated database is fine
    if let Err(e) = migration::Migrator::up(&db, None).await {
        let msg = format!("{}", e);
        if msg.contains("duplicate key value violates unique constraint") {
            eprintln!("migrations already applied, continue: {}", msg);
        } else {
            return Err(e.into());
        }
    }
    let cipher = FieldCipher::from_base64_key(&generate_base64_key())?;
    let state = auth::ServerState {
        db,
        auth: auth::ServerAuthConfig { jwt_secret: "test-secret".into() },
        cipher,
    };
    Ok(routes::build_router(cors(), state))
}

fn post_json(uri: &str, body: &Value, token: Option<&str>) -> anyhow::Result<Request<Body>> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(t) = token {
        builder = builder.header("authorization", format!("Bearer {}", t));
    }
    Ok(builder.body(Body::from(serde_json::to_vec(body)?))?)
}

fn get(uri: &str, token: Option<&str>) -> anyhow::Result<Request<Body>> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(t) = token {
        builder = builder.header("authorization", format!("Bearer {}", t));
    }
    Ok(builder.body(Body::empty())?)
}

async fn body_json(resp: axum::response::Response) -> anyhow::Result<Value> {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn vendor_payload(email: &str) -> Value {
    json!({
        "email": email,
        "password": "S3curePass!",
        "userType": 2,
        "firstName": "Vera",
        "lastName": "Vendor",
        "address": {"street": "1 Roast Rd", "city": "Montreal", "province": "QC"},
        "shop": {
            "name": "Beans & Co",
            "description": "Small batch roaster",
            "address": "1 Roast Rd",
            "image": "",
            "location": {"lat": 45.5, "lng": -73.6},
            "deliveryRange": 5.0
        }
    })
}

fn buyer_payload(email: &str) -> Value {
    json!({
        "email": email,
        "password": "S3curePass!",
        "userType": 1,
        "firstName": "Max",
        "lastName": "Martin",
        "address": {"street": "2 Main St", "city": "Montreal", "province": "QC"}
    })
}

#[tokio::test]
async fn test_vendor_signup_and_signin_flow() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let app = build_app().await?;
    let email = format!("vendor_{}@example.com", Uuid::new_v4());

    let resp = app.clone().call(post_json("/auth/signup", &vendor_payload(&email), None)?).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let session = body_json(resp).await?;
    assert!(session["token"].as_str().is_some());
    assert_eq!(session["user"]["firstName"], "Vera");
    assert_eq!(session["shop"]["name"], "Beans & Co");

    // Sign-in returns the shop again, and a fresh token
    let resp = app
        .clone()
        .call(post_json("/auth/signin", &json!({"email": email, "password": "S3curePass!"}), None)?)
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let session = body_json(resp).await?;
    let token = session["token"].as_str().unwrap().to_string();
    assert_eq!(session["shop"]["name"], "Beans & Co");

    // The token works against a protected route
    let resp = app.clone().call(get("/account/me", Some(&token))?).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let me = body_json(resp).await?;
    assert_eq!(me["firstName"], "Vera");
    assert_eq!(me["email"], email);
    Ok(())
}

#[tokio::test]
async fn test_signin_wrong_password() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let app = build_app().await?;
    let email = format!("buyer_{}@example.com", Uuid::new_v4());

    let resp = app.clone().call(post_json("/auth/signup", &buyer_payload(&email), None)?).await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .clone()
        .call(post_json("/auth/signin", &json!({"email": email, "password": "wrong"}), None)?)
        .await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await?;
    assert_eq!(body["error"], "Email or password is incorrect.");
    Ok(())
}

#[tokio::test]
async fn test_signup_short_password_rejected() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let app = build_app().await?;
    let mut payload = buyer_payload(&format!("buyer_{}@example.com", Uuid::new_v4()));
    payload["password"] = json!("short");

    let resp = app.clone().call(post_json("/auth/signup", &payload, None)?).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await?;
    assert_eq!(body["error"], "Password must be at least 6 characters long.");
    Ok(())
}

#[tokio::test]
async fn test_protected_routes_require_token() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let app = build_app().await?;

    let resp = app.clone().call(get("/account/me", None)?).await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app.clone().call(get("/account/me", Some("not.a.jwt"))?).await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Health stays public
    let resp = app.clone().call(get("/health", None)?).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_bean_and_review_flow() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let app = build_app().await?;

    // Vendor with a shop
    let vendor_email = format!("vendor_{}@example.com", Uuid::new_v4());
    let resp = app.clone().call(post_json("/auth/signup", &vendor_payload(&vendor_email), None)?).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let vendor_token = body_json(resp).await?["token"].as_str().unwrap().to_string();

    // Create a listing
    let bean = json!({
        "name": "Yirgacheffe",
        "species": "arabica",
        "origin": "Ethiopia",
        "roastingLevel": "light",
        "price": 18.5
    });
    let resp = app.clone().call(post_json("/beans/create", &bean, Some(&vendor_token))?).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let bean_id = body_json(resp).await?["id"].as_str().unwrap().to_string();

    // Public details need no token
    let resp = app.clone().call(get(&format!("/beans/{}/details", bean_id), None)?).await?;
    assert_eq!(resp.status(), StatusCode::OK);

    // Buyer reviews the bean once
    let buyer_email = format!("buyer_{}@example.com", Uuid::new_v4());
    let resp = app.clone().call(post_json("/auth/signup", &buyer_payload(&buyer_email), None)?).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let buyer_token = body_json(resp).await?["token"].as_str().unwrap().to_string();

    let review = json!({"coffeeBeanId": bean_id, "rating": 4, "comment": "bright and floral"});
    let resp = app.clone().call(post_json("/reviews/create", &review, Some(&buyer_token))?).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let created = body_json(resp).await?;
    assert_eq!(created["user"]["firstName"], "Max");

    // A second review from the same buyer conflicts
    let resp = app.clone().call(post_json("/reviews/create", &review, Some(&buyer_token))?).await?;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // Reviews stay publicly readable
    let resp = app.clone().call(get(&format!("/beans/{}/reviews", bean_id), None)?).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let listed = body_json(resp).await?;
    assert_eq!(listed.as_array().map(|a| a.len()), Some(1));
    Ok(())
}
