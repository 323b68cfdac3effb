//! Router-level tests for login, session tokens, the webhook, and admin mode.

mod common;

use axum::http::{Method, StatusCode};
use chirpy_api::models::{ErrorResponse, RefreshResponse, UserResponse};
use chirpy_core::config::RotationPolicy;
use common::*;
use serde_json::json;

#[tokio::test]
async fn healthz_is_ok() {
    let app = app("prod");
    let (status, body) = app.send(Method::GET, "/api/healthz", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text(&body), "OK");
}

#[tokio::test]
async fn register_returns_user_without_password() {
    let app = app("prod");
    let user = app.register("walt@breakingbad.com", "123456").await;
    assert_eq!(user["email"], "walt@breakingbad.com");
    assert_eq!(user["is_chirpy_red"], false);
    assert!(user.get("id").is_some());
    assert!(user.get("password").is_none());
    assert!(user.get("hashed_password").is_none());
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let app = app("prod");
    app.register("saul@bettercall.com", "pw").await;
    let (status, _) = app
        .send(
            Method::POST,
            "/api/users",
            None,
            Some(json!({"email": "saul@bettercall.com", "password": "other"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_returns_token_pair() {
    let app = app("prod");
    let login = app.signup("walt@breakingbad.com", "123456").await;
    assert_eq!(login.user.email, "walt@breakingbad.com");
    assert!(!login.token.is_empty());
    assert!(!login.refresh_token.is_empty());
    assert_ne!(login.token, login.refresh_token);
}

#[tokio::test]
async fn bad_credentials_fail_identically() {
    let app = app("prod");
    app.register("walt@breakingbad.com", "123456").await;

    let (wrong_pw_status, wrong_pw_body) = app
        .send(
            Method::POST,
            "/api/login",
            None,
            Some(json!({"email": "walt@breakingbad.com", "password": "654321"})),
        )
        .await;
    let (unknown_status, unknown_body) = app
        .send(
            Method::POST,
            "/api/login",
            None,
            Some(json!({"email": "jesse@breakingbad.com", "password": "123456"})),
        )
        .await;

    assert_eq!(wrong_pw_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_pw_body, unknown_body);
    let err: ErrorResponse = parse(&wrong_pw_body);
    assert_eq!(err.error, "Incorrect email or password");
}

#[tokio::test]
async fn unauthenticated_responses_are_uniform() {
    let app = app("prod");
    let login = app.signup("walt@breakingbad.com", "123456").await;

    let cases = [
        None,
        Some(format!("Token {}", login.token)),
        Some("Bearer not.a.jwt".to_string()),
        Some(bearer(&login.refresh_token)),
    ];
    let mut bodies = Vec::new();
    for auth in &cases {
        let (status, body) = app
            .send(
                Method::POST,
                "/api/chirps",
                auth.as_deref(),
                Some(json!({"body": "hello"})),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "auth {auth:?}");
        bodies.push(body);
    }
    assert!(bodies.windows(2).all(|pair| pair[0] == pair[1]));
}

#[tokio::test]
async fn refresh_mints_working_access_token() {
    let app = app("prod");
    let login = app.signup("walt@breakingbad.com", "123456").await;

    let (status, body) = app
        .send(Method::POST, "/api/refresh", Some(&bearer(&login.refresh_token)), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let refreshed: RefreshResponse = parse(&body);
    assert!(refreshed.refresh_token.is_none());

    let (status, _) = app.create_chirp(&refreshed.token, "fresh token").await;
    assert_eq!(status, StatusCode::CREATED);

    // Reuse policy: the same refresh token keeps working.
    let (status, _) = app
        .send(Method::POST, "/api/refresh", Some(&bearer(&login.refresh_token)), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn revoked_refresh_token_is_rejected() {
    let app = app("prod");
    let login = app.signup("walt@breakingbad.com", "123456").await;
    let auth = bearer(&login.refresh_token);

    let (status, body) = app.send(Method::POST, "/api/revoke", Some(&auth), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());

    let (status, _) = app.send(Method::POST, "/api/refresh", Some(&auth), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Revoking again is not an error.
    let (status, _) = app.send(Method::POST, "/api/revoke", Some(&auth), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // The access token is stateless and stays valid until it expires.
    let (status, _) = app.create_chirp(&login.token, "still signed in").await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn unknown_or_missing_refresh_token_is_unauthorized() {
    let app = app("prod");
    let login = app.signup("walt@breakingbad.com", "123456").await;

    for auth in [None, Some(bearer("never-issued")), Some(bearer(&login.token))] {
        for uri in ["/api/refresh", "/api/revoke"] {
            let (status, _) = app.send(Method::POST, uri, auth.as_deref(), None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri} with {auth:?}");
        }
    }
}

#[tokio::test]
async fn rotation_replaces_refresh_token() {
    let app = app_with("prod", RotationPolicy::Rotate, ".".into());
    let login = app.signup("walt@breakingbad.com", "123456").await;

    let (status, body) = app
        .send(Method::POST, "/api/refresh", Some(&bearer(&login.refresh_token)), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let refreshed: RefreshResponse = parse(&body);
    let replacement = refreshed.refresh_token.expect("rotated token");
    assert_ne!(replacement, login.refresh_token);

    let (status, _) = app
        .send(Method::POST, "/api/refresh", Some(&bearer(&login.refresh_token)), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(Method::POST, "/api/refresh", Some(&bearer(&replacement)), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn update_user_changes_credentials_and_ends_sessions() {
    let app = app("prod");
    let login = app.signup("walt@breakingbad.com", "123456").await;

    let (status, body) = app
        .send(
            Method::PUT,
            "/api/users",
            Some(&bearer(&login.token)),
            Some(json!({"email": "heisenberg@breakingbad.com", "password": "losPollos"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let user: UserResponse = parse(&body);
    assert_eq!(user.id, login.user.id);
    assert_eq!(user.email, "heisenberg@breakingbad.com");

    let (status, _) = app
        .send(Method::POST, "/api/refresh", Some(&bearer(&login.refresh_token)), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/login",
            None,
            Some(json!({"email": "walt@breakingbad.com", "password": "123456"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    app.login("heisenberg@breakingbad.com", "losPollos").await;
}

#[tokio::test]
async fn update_user_requires_authentication() {
    let app = app("prod");
    let (status, _) = app
        .send(
            Method::PUT,
            "/api/users",
            None,
            Some(json!({"email": "a@example.com", "password": "pw"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn webhook_requires_exact_api_key() {
    let app = app("prod");
    let login = app.signup("walt@breakingbad.com", "123456").await;
    let payload = json!({"event": "user.upgraded", "data": {"user_id": login.user.id}});

    let rejected = [
        None,
        Some(format!("Bearer {POLKA_KEY}")),
        Some("ApiKey wrong".to_string()),
        Some(format!("ApiKey {}", &POLKA_KEY[..POLKA_KEY.len() - 1])),
        Some(format!("ApiKey {}", &POLKA_KEY[1..])),
        Some(format!("ApiKey {POLKA_KEY}x")),
    ];
    for auth in &rejected {
        let (status, _) = app
            .send(
                Method::POST,
                "/api/polka/webhooks",
                auth.as_deref(),
                Some(payload.clone()),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "auth {auth:?}");
    }
    assert!(!app.login("walt@breakingbad.com", "123456").await.user.is_chirpy_red);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/polka/webhooks",
            Some(&format!("ApiKey {POLKA_KEY}")),
            Some(payload),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(app.login("walt@breakingbad.com", "123456").await.user.is_chirpy_red);
}

#[tokio::test]
async fn webhook_ignores_other_events_and_unknown_users() {
    let app = app("prod");
    let auth = format!("ApiKey {POLKA_KEY}");
    let stranger = uuid::Uuid::new_v4();

    let (status, _) = app
        .send(
            Method::POST,
            "/api/polka/webhooks",
            Some(&auth),
            Some(json!({"event": "user.payment_failed", "data": {"user_id": stranger}})),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/polka/webhooks",
            Some(&auth),
            Some(json!({"event": "user.upgraded", "data": {"user_id": stranger}})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_reset_is_forbidden_outside_dev() {
    let app = app("prod");
    app.register("walt@breakingbad.com", "123456").await;

    let (status, _) = app.send(Method::POST, "/admin/reset", None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    app.login("walt@breakingbad.com", "123456").await;
}

#[tokio::test]
async fn admin_reset_in_dev_deletes_users() {
    let app = app("dev");
    let login = app.signup("walt@breakingbad.com", "123456").await;

    let (status, _) = app.send(Method::POST, "/admin/reset", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/login",
            None,
            Some(json!({"email": "walt@breakingbad.com", "password": "123456"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(Method::POST, "/api/refresh", Some(&bearer(&login.refresh_token)), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_json_bodies_get_json_errors() {
    let app = app("prod");
    let login = app.signup("walt@breakingbad.com", "123456").await;
    let token = bearer(&login.token);
    let api_key = format!("ApiKey {POLKA_KEY}");

    let endpoints = [
        (Method::POST, "/api/users", None),
        (Method::PUT, "/api/users", Some(token.as_str())),
        (Method::POST, "/api/login", None),
        (Method::POST, "/api/chirps", Some(token.as_str())),
        (Method::POST, "/api/polka/webhooks", Some(api_key.as_str())),
    ];
    let bodies = [
        (Some("application/json"), "{not json"),
        (Some("application/json"), r#"{"unexpected": 1}"#),
        (None, "{}"),
    ];
    for (method, uri, auth) in &endpoints {
        for (content_type, body) in &bodies {
            let (status, resp) = app
                .send_raw(method.clone(), uri, *auth, *content_type, body)
                .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{method} {uri} {body}");
            let err: ErrorResponse = parse(&resp);
            assert!(!err.error.is_empty(), "{method} {uri} {body}");
        }
    }
}
