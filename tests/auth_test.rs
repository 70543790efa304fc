//! Accounts, sessions, password reset and profile editing

mod helpers;

use axum::http::StatusCode;
use helpers::*;
use serde_json::{json, Value};

use eventhub::config::BootstrapAdmin;
use eventhub::models::Role;

#[tokio::test]
async fn test_signup_and_login() {
    let app = TestApp::new();
    let user = app.signup_user().await;

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": user.email.to_uppercase(), "password": user.password }))
        .await;
    response.assert_status(StatusCode::OK);
    let token = response.json::<Value>()["token"].as_str().unwrap().to_string();

    let claims = app.state.services.auth_service.tokens().verify(&token).unwrap();
    assert_eq!(claims.sub, user.id);
    assert_eq!(claims.role, Role::User);
    assert_eq!(claims.exp - claims.iat, 3600);

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": user.email, "password": "wrong-password" }))
        .await;
    assert_error(&response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED");

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": random_email(), "password": TEST_PASSWORD }))
        .await;
    assert_error(&response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED");
}

#[tokio::test]
async fn test_signup_rejects_bad_input() {
    let app = TestApp::new();
    let user = app.signup_user().await;

    let response = app
        .server
        .post("/api/auth/signup")
        .json(&json!({
            "firstName": "Dean",
            "lastName": "Collins",
            "email": user.email.to_uppercase(),
            "password": TEST_PASSWORD,
        }))
        .await;
    assert_error(&response, StatusCode::CONFLICT, "CONFLICT");

    let response = app
        .server
        .post("/api/auth/signup")
        .json(&json!({
            "firstName": "Dean",
            "lastName": "Collins",
            "email": random_email(),
            "password": "short",
        }))
        .await;
    assert_error(&response, StatusCode::BAD_REQUEST, "VALIDATION");

    let response = app
        .server
        .post("/api/auth/signup")
        .json(&json!({ "firstName": "Dean", "email": random_email(), "password": TEST_PASSWORD }))
        .await;
    assert_error(&response, StatusCode::BAD_REQUEST, "VALIDATION");

    let response = app
        .server
        .post("/api/auth/signup")
        .text("{not json")
        .content_type("application/json")
        .await;
    assert_error(&response, StatusCode::BAD_REQUEST, "VALIDATION");
}

#[tokio::test]
async fn test_admin_login_rules() {
    let app = TestApp::new();
    let user = app.signup_user().await;
    let admin = app.create_admin().await;

    let response = app
        .server
        .post("/api/auth/admin/login")
        .json(&json!({ "email": user.email, "password": user.password }))
        .await;
    assert_error(&response, StatusCode::FORBIDDEN, "FORBIDDEN");

    let response = app
        .server
        .post("/api/auth/admin/login")
        .json(&json!({ "email": user.email, "password": "wrong-password" }))
        .await;
    assert_error(&response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED");

    let claims = app.state.services.auth_service.tokens().verify(&admin.token).unwrap();
    assert_eq!(claims.role, Role::Admin);
    assert_eq!(claims.exp - claims.iat, 5 * 3600);
}

#[tokio::test]
async fn test_admins_create_admins() {
    let app = TestApp::new();
    let admin = app.create_admin().await;
    let user = app.signup_user().await;
    let email = random_email();
    let body = json!({
        "firstName": "Ann",
        "lastName": "Johnson",
        "email": email,
        "password": TEST_PASSWORD,
    });

    let response = authed(app.server.post("/api/auth/admin/create"), &user).json(&body).await;
    assert_error(&response, StatusCode::FORBIDDEN, "FORBIDDEN");

    let response = app.server.post("/api/auth/admin/create").json(&body).await;
    assert_error(&response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED");

    let response = authed(app.server.post("/api/auth/admin/create"), &admin).json(&body).await;
    response.assert_status(StatusCode::CREATED);
    assert!(response.json::<Value>()["msg"].is_string());

    let response = app
        .server
        .post("/api/auth/admin/login")
        .json(&json!({ "email": email, "password": TEST_PASSWORD }))
        .await;
    response.assert_status(StatusCode::OK);

    let response = authed(app.server.post("/api/auth/admin/create"), &admin).json(&body).await;
    assert_error(&response, StatusCode::CONFLICT, "CONFLICT");
}

#[tokio::test]
async fn test_password_reset_flow() {
    let app = TestApp::new();
    let user = app.signup_user().await;

    let response = app
        .server
        .post("/api/auth/forgot-password")
        .json(&json!({ "email": user.email }))
        .await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.json::<Value>()["status"], "success");

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].1.starts_with("http://client.test/reset-password/"));
    assert!(!sent[0].1.contains("reset-password//"));
    let token = app.mailer.last_token_for(&user.email).unwrap();

    let response = app
        .server
        .patch(&format!("/api/auth/reset-password/{}", token))
        .json(&json!({ "password": "brand-new-pass", "confirmPassword": "something-else" }))
        .await;
    assert_error(&response, StatusCode::BAD_REQUEST, "VALIDATION");

    let response = app
        .server
        .patch(&format!("/api/auth/reset-password/{}", token))
        .json(&json!({ "password": "brand-new-pass", "confirmPassword": "brand-new-pass" }))
        .await;
    response.assert_status(StatusCode::OK);
    assert!(response.json::<Value>()["token"].is_string());

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": user.email, "password": user.password }))
        .await;
    assert_error(&response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED");

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": user.email, "password": "brand-new-pass" }))
        .await;
    response.assert_status(StatusCode::OK);

    // Tokens are single use
    let response = app
        .server
        .patch(&format!("/api/auth/reset-password/{}", token))
        .json(&json!({ "password": "another-pass-1", "confirmPassword": "another-pass-1" }))
        .await;
    assert_error(&response, StatusCode::BAD_REQUEST, "VALIDATION");
}

#[tokio::test]
async fn test_forgot_password_for_unknown_email_sends_nothing() {
    let app = TestApp::new();

    let response = app
        .server
        .post("/api/auth/forgot-password")
        .json(&json!({ "email": random_email() }))
        .await;
    response.assert_status(StatusCode::OK);
    assert!(app.mailer.sent().is_empty());
}

#[tokio::test]
async fn test_expired_reset_token_is_rejected() {
    let mut settings = test_settings();
    settings.auth.reset_token_ttl_secs = 0;
    let app = TestApp::with_settings(settings);
    let user = app.signup_user().await;

    app.server
        .post("/api/auth/forgot-password")
        .json(&json!({ "email": user.email }))
        .await
        .assert_status(StatusCode::OK);
    let token = app.mailer.last_token_for(&user.email).unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;

    let response = app
        .server
        .patch(&format!("/api/auth/reset-password/{}", token))
        .json(&json!({ "password": "brand-new-pass", "confirmPassword": "brand-new-pass" }))
        .await;
    assert_error(&response, StatusCode::BAD_REQUEST, "VALIDATION");
}

#[tokio::test]
async fn test_profile_update() {
    let app = TestApp::new();
    let user = app.signup_user().await;
    let other = app.signup_user().await;

    let response = authed(app.server.put("/api/profile/me"), &user)
        .json(&json!({ "firstName": "Whitey", "location": "Harlem", "bio": "Lindy since 1935" }))
        .await;
    response.assert_status(StatusCode::OK);
    let profile = response.json::<Value>();
    assert_eq!(profile["firstName"], "Whitey");
    assert_eq!(profile["location"], "Harlem");
    assert_eq!(profile["email"], user.email);

    let response = authed(app.server.put("/api/profile/me"), &user)
        .json(&json!({ "email": other.email }))
        .await;
    assert_error(&response, StatusCode::CONFLICT, "CONFLICT");

    let response = authed(app.server.put("/api/profile/me"), &user)
        .json(&json!({ "email": "nope" }))
        .await;
    assert_error(&response, StatusCode::BAD_REQUEST, "VALIDATION");

    let response = app.server.get("/api/profile/me").await;
    assert_error(&response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED");
}

#[tokio::test]
async fn test_bootstrap_admin_is_idempotent() {
    let email = random_email();
    let mut settings = test_settings();
    settings.auth.bootstrap_admin = Some(BootstrapAdmin {
        email: email.clone(),
        password: TEST_PASSWORD.to_string(),
        first_name: "Root".to_string(),
        last_name: "Admin".to_string(),
    });
    let app = TestApp::with_settings(settings);

    let first = app.state.services.auth_service.ensure_bootstrap_admin().await.unwrap().unwrap();
    let second = app.state.services.auth_service.ensure_bootstrap_admin().await.unwrap().unwrap();
    assert_eq!(first.id, second.id);
    assert!(second.is_admin());

    let response = app
        .server
        .post("/api/auth/admin/login")
        .json(&json!({ "email": email, "password": TEST_PASSWORD }))
        .await;
    response.assert_status(StatusCode::OK);
}
