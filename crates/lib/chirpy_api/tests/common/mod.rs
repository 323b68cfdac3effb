//! Shared helpers for router-level tests: an in-memory store, a configured
//! router, and small request/response shortcuts.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use chirpy_api::config::ApiConfig;
use chirpy_api::models::LoginResponse;
use chirpy_api::{AppState, router};
use chirpy_core::config::{AuthConfig, RotationPolicy};
use chirpy_core::store::MemoryStore;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tower::ServiceExt;

pub const JWT_SECRET: &str = "test-jwt-secret";
pub const POLKA_KEY: &str = "f271c81ff7084ee5b99a5091b42d486e";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

pub fn auth_config(platform: &str, rotation: RotationPolicy) -> AuthConfig {
    AuthConfig {
        jwt_secret: JWT_SECRET.into(),
        polka_key: POLKA_KEY.into(),
        platform: platform.into(),
        rotation,
    }
}

pub fn app_with(platform: &str, rotation: RotationPolicy, filepath_root: PathBuf) -> TestApp {
    let config = ApiConfig {
        bind_addr: "127.0.0.1:0".into(),
        filepath_root,
        auth: auth_config(platform, rotation),
    };
    let state = AppState::new(Arc::new(MemoryStore::new()), config);
    TestApp {
        router: router(state.clone()),
        state,
    }
}

pub fn app(platform: &str) -> TestApp {
    app_with(platform, RotationPolicy::Reuse, PathBuf::from("."))
}

impl TestApp {
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        authorization: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let req = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let resp = self.router.clone().oneshot(req).await.expect("request");
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        (status, bytes.to_vec())
    }

    /// Send `body` verbatim, with an optional content type.
    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        authorization: Option<&str>,
        content_type: Option<&str>,
        body: &str,
    ) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        if let Some(value) = content_type {
            builder = builder.header(header::CONTENT_TYPE, value);
        }
        let req = builder.body(Body::from(body.to_owned())).unwrap();

        let resp = self.router.clone().oneshot(req).await.expect("request");
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        (status, bytes.to_vec())
    }

    pub async fn register(&self, email: &str, password: &str) -> Value {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/users",
                None,
                Some(json!({"email": email, "password": password})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        parse(&body)
    }

    pub async fn login(&self, email: &str, password: &str) -> LoginResponse {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/login",
                None,
                Some(json!({"email": email, "password": password})),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", text(&body));
        parse(&body)
    }

    /// Register and log in, returning the login response.
    pub async fn signup(&self, email: &str, password: &str) -> LoginResponse {
        self.register(email, password).await;
        self.login(email, password).await
    }

    pub async fn create_chirp(&self, token: &str, body: &str) -> (StatusCode, Vec<u8>) {
        self.send(
            Method::POST,
            "/api/chirps",
            Some(&bearer(token)),
            Some(json!({"body": body})),
        )
        .await
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

pub fn parse<T: DeserializeOwned>(body: &[u8]) -> T {
    serde_json::from_slice(body).expect("parse JSON")
}

pub fn text(body: &[u8]) -> String {
    String::from_utf8_lossy(body).into_owned()
}
