#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, LOCATION};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use blueprints_api::auth::jwt::{generate_access_token, JwtConfig};
use blueprints_api::auth::password::hash_password;
use blueprints_api::config::ServerConfig;
use blueprints_api::media::MediaStore;
use blueprints_api::router::build_app_router;
use blueprints_api::state::AppState;
use blueprints_db::models::blueprint::{Blueprint, CreateBlueprint, TagSelection};
use blueprints_db::models::user::{CreateUser, User};
use blueprints_db::repositories::{BlueprintRepo, UserRepo};

pub const TEST_PASSWORD: &str = "Password_123";

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// A fresh, unique media directory under the system temp dir.
pub fn temp_media_root() -> PathBuf {
    std::env::temp_dir().join(format!("blueprints-test-{}", uuid::Uuid::new_v4()))
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(media_root: PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        media_root,
        max_upload_bytes: 10 * 1024 * 1024,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

/// Build the full application router, storing uploads in `media_root`.
pub fn build_test_app_with_media(pool: PgPool, media_root: PathBuf) -> Router {
    let config = test_config(media_root.clone());
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        media: Arc::new(MediaStore::new(media_root)),
    };
    build_app_router(state, &config)
}

/// Build the full application router with a throwaway media directory.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_media(pool, temp_media_root())
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a user whose password is [`TEST_PASSWORD`].
pub async fn create_user(pool: &PgPool, username: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
        },
    )
    .await
    .expect("user creation should succeed")
}

/// Bearer token for `user_id`, signed with the test secret.
pub fn token_for(user_id: i64) -> String {
    generate_access_token(user_id, &test_config(temp_media_root()).jwt)
        .expect("token generation should succeed")
}

/// Insert a blueprint directly, with the given new tag names.
pub async fn create_blueprint(pool: &PgPool, owner_id: i64, title: &str, tags: &[&str]) -> Blueprint {
    BlueprintRepo::create(
        pool,
        &CreateBlueprint {
            owner_id,
            title: title.to_string(),
            description: "Test description".to_string(),
            blueprint_string: "0eNqVkt1ugzAMhd".to_string(),
            image_path: format!("user_{owner_id}/test.png"),
        },
        &TagSelection {
            existing_ids: Vec::new(),
            new_names: tags.iter().map(|t| t.to_string()).collect(),
        },
    )
    .await
    .expect("blueprint creation should succeed")
}

/// A small valid PNG.
pub fn png_bytes() -> Vec<u8> {
    let img: image::ImageBuffer<image::Rgb<u8>, Vec<u8>> = image::ImageBuffer::new(4, 4);
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

/// Number of likes on a blueprint.
pub async fn like_count(pool: &PgPool, blueprint_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE blueprint_id = $1")
        .bind(blueprint_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

fn with_auth(builder: axum::http::request::Builder, token: Option<&str>) -> axum::http::request::Builder {
    match token {
        Some(token) => builder.header(AUTHORIZATION, format!("Bearer {token}")),
        None => builder,
    }
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = with_auth(Request::builder().uri(uri), Some(token))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// POST an `application/x-www-form-urlencoded` body.
pub async fn post_form(
    app: Router,
    uri: &str,
    fields: &[(&str, &str)],
    token: Option<&str>,
) -> Response<Body> {
    let request = with_auth(Request::builder().method(Method::POST).uri(uri), token)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form_encode(fields)))
        .unwrap();
    send(app, request).await
}

/// One part of a multipart body.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        filename: &'a str,
        bytes: Vec<u8>,
    },
}

const BOUNDARY: &str = "blueprints-test-boundary";

/// POST a `multipart/form-data` body.
pub async fn post_multipart(
    app: Router,
    uri: &str,
    parts: Vec<Part<'_>>,
    token: Option<&str>,
) -> Response<Body> {
    let request = with_auth(Request::builder().method(Method::POST).uri(uri), token)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap();
    send(app, request).await
}

fn multipart_body(parts: Vec<Part<'_>>) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                filename,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(&bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn form_encode(fields: &[(&str, &str)]) -> String {
    fn encode(s: &str) -> String {
        s.bytes()
            .map(|b| match b {
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                    (b as char).to_string()
                }
                b' ' => "+".to_string(),
                _ => format!("%{b:02X}"),
            })
            .collect()
    }
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// Collect the response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// The `Location` header of a redirect.
pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(LOCATION)
        .expect("response must carry a Location header")
        .to_str()
        .unwrap()
        .to_string()
}
