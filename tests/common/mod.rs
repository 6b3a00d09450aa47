#![allow(dead_code)]

use std::io::Cursor;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use image::{ImageBuffer, ImageFormat, Rgb};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot`

use shelfmate::config::Config;
use shelfmate::db;
use shelfmate::infrastructure::AppState;
use shelfmate::server;

pub const BOUNDARY: &str = "shelfmate-test-boundary";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub uploads: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

// Helper to build an app on a fresh in-memory database
pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

pub async fn spawn_app_with(configure: impl FnOnce(&mut Config)) -> TestApp {
    let uploads = tempfile::tempdir().expect("Failed to create uploads dir");
    let mut config = Config::for_tests(uploads.path());
    config.rate_limit.max_requests = 1_000;
    configure(&mut config);

    let db = db::init_db(&config.database_url)
        .await
        .expect("Failed to init DB");
    let state = AppState::new(db, config);
    let router = server::build_router(state.clone());

    TestApp {
        router,
        state,
        uploads,
    }
}

impl TestApp {
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(request("GET", uri, token, None)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(request("DELETE", uri, token, None)).await
    }

    pub async fn post_json(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(request("POST", uri, token, Some(body))).await
    }

    pub async fn put_json(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(request("PUT", uri, token, Some(body))).await
    }

    pub async fn register(&self, email: &str, username: &str, password: &str) -> i32 {
        let res = self
            .post_json(
                "/api/auth/register",
                None,
                json!({ "email": email, "username": username, "password": password }),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "register failed: {}", res.body);
        res.body["id"].as_i64().unwrap() as i32
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let res = self
            .post_json(
                "/api/auth/login",
                None,
                json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK, "login failed: {}", res.body);
        res.body["token"].as_str().unwrap().to_string()
    }

    /// Register `name@test.dev` with password `password` and log in
    pub async fn user(&self, name: &str) -> (i32, String) {
        let email = format!("{}@test.dev", name);
        let id = self.register(&email, name, "password").await;
        let token = self.login(&email, "password").await;
        (id, token)
    }

    /// Create a book through the multipart route with a small PNG cover
    pub async fn create_book(&self, token: &str, user_id: i32, title: &str, status: &str) -> Value {
        let user_id = user_id.to_string();
        let fields = [
            ("userId", user_id.as_str()),
            ("title", title),
            ("author", "Test Author"),
            ("status", status),
        ];
        let res = self
            .send(multipart_request(
                "POST",
                "/api/books",
                token,
                &fields,
                Some(png_bytes(8, 8)),
            ))
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "create failed: {}", res.body);
        res.body
    }
}

pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn multipart_body(fields: &[(&str, &str)], cover: Option<Vec<u8>>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some(bytes) = cover {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"coverImage\"; filename=\"cover.png\"\r\nContent-Type: image/png\r\n\r\n",
                BOUNDARY
            )
            .as_bytes(),
        );
        body.extend_from_slice(&bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_request(
    method: &str,
    uri: &str,
    token: &str,
    fields: &[(&str, &str)],
    cover: Option<Vec<u8>>,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(fields, cover)))
        .unwrap()
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = ImageBuffer::from_pixel(width, height, Rgb([40u8, 90, 160]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// Absolute path of a stored cover given its public `/uploads/...` path
pub fn cover_path(app: &TestApp, public: &str) -> std::path::PathBuf {
    app.state.covers.resolve(public).unwrap()
}
