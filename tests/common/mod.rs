#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use chemsolve::config::Config;
use http_body_util::BodyExt;
use std::path::PathBuf;
use tower::ServiceExt;

pub const ADMIN_PASSWORD: &str = "test-admin-password";

pub struct TestApp {
    pub router: Router,
    pub users_path: PathBuf,
    pub public_dir: PathBuf,
}

/// Config pointing at fresh temp files, with cheap password hashing.
pub fn test_config(upstream_base_url: &str) -> Config {
    let root = std::env::temp_dir().join(format!("chemsolve-it-{}", uuid::Uuid::new_v4()));
    let public_dir = root.join("public");
    std::fs::create_dir_all(&public_dir).unwrap();
    for page in ["index", "library", "admin", "login"] {
        std::fs::write(
            public_dir.join(format!("{page}.html")),
            format!("<html><body>{page} page</body></html>"),
        )
        .unwrap();
    }

    let mut config = Config::default();
    config.general.users_path = root.join("data").join("users.json").display().to_string();
    config.server.public_dir = public_dir.display().to_string();
    config.server.session_secret = "integration-test-secret".to_string();
    config.security.admin_password = ADMIN_PASSWORD.to_string();
    config.security.argon2_memory_cost_kib = 64;
    config.security.argon2_time_cost = 1;
    config.upstream.base_url = upstream_base_url.to_string();
    config.upstream.api_key = "test-key".to_string();
    config.observability.metrics_enabled = false;
    config
}

pub fn spawn_app_with_config(config: Config) -> TestApp {
    let users_path = PathBuf::from(&config.general.users_path);
    let public_dir = PathBuf::from(&config.server.public_dir);

    let state = chemsolve::api::create_app_state_from_config(config, None)
        .expect("failed to create app state");

    TestApp {
        router: chemsolve::api::router(state),
        users_path,
        public_dir,
    }
}

/// App whose upstream is a closed port; any forwarded call would fail with 500.
pub fn spawn_app() -> TestApp {
    spawn_app_with_config(test_config("http://127.0.0.1:9"))
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(
        &self,
        uri: &str,
        body: serde_json::Value,
        cookie: Option<&str>,
    ) -> Response<Body> {
        self.send(json_request("POST", uri, &body, cookie)).await
    }

    pub async fn delete(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("DELETE").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn register(&self, username: &str, password: &str) -> StatusCode {
        self.post_json(
            "/api/register",
            serde_json::json!({"username": username, "password": password}),
            None,
        )
        .await
        .status()
    }

    /// Logs in and returns the status plus the session cookie, if one was set.
    pub async fn login(&self, username: &str, password: &str) -> (StatusCode, Option<String>) {
        let response = self
            .post_json(
                "/api/login",
                serde_json::json!({"username": username, "password": password}),
                None,
            )
            .await;
        (response.status(), session_cookie(&response))
    }

    pub async fn login_as_admin(&self) -> String {
        let (status, cookie) = self.login("admin", ADMIN_PASSWORD).await;
        assert_eq!(status, StatusCode::OK);
        cookie.expect("admin login should set a session cookie")
    }

    pub async fn register_and_login(&self, username: &str, password: &str) -> String {
        assert_eq!(self.register(username, password).await, StatusCode::CREATED);
        let (status, cookie) = self.login(username, password).await;
        assert_eq!(status, StatusCode::OK);
        cookie.expect("login should set a session cookie")
    }
}

pub fn json_request(
    method: &str,
    uri: &str,
    body: &serde_json::Value,
    cookie: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref());
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// `name=value` of the session cookie from a response, if it sets one.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(chemsolve::api::session::SESSION_COOKIE))
        .and_then(|v| v.split(';').next())
        .map(ToString::to_string)
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
