//! Test application context
//!
//! Builds the full router over the in-memory reference database and drives it
//! through `axum-test`, so tests exercise extractors, services and drivers
//! exactly as a real client would.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
use axum_test::{TestRequest, TestResponse, TestServer};
use serde_json::{json, Value};
use uuid::Uuid;

use eventhub::config::{DatabaseDriver, Settings};
use eventhub::database::Database;
use eventhub::models::{Role, User};
use eventhub::services::Mailer;
use eventhub::state::AppState;
use eventhub::Result;

use super::test_data::{random_email, random_name, TEST_PASSWORD};

/// Mailer that keeps every reset link it was asked to send
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingMailer {
    /// `(email, reset_url)` pairs in send order
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// Token part of the last reset link sent to `email`
    pub fn last_token_for(&self, email: &str) -> Option<String> {
        self.sent()
            .into_iter()
            .rev()
            .find(|(to, _)| to == email)
            .and_then(|(_, url)| url.rsplit('/').next().map(str::to_string))
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_password_reset(&self, email: &str, reset_url: &str) -> Result<()> {
        self.sent.lock().unwrap().push((email.to_string(), reset_url.to_string()));
        Ok(())
    }
}

/// Signed-in account used by tests
#[derive(Debug, Clone)]
pub struct TestAccount {
    pub id: Uuid,
    pub email: String,
    pub password: String,
    pub token: String,
}

/// Settings suitable for tests: reference driver, fast bcrypt
pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.database.driver = DatabaseDriver::Reference;
    settings.auth.jwt_secret = "integration-test-secret-with-enough-length".to_string();
    settings.auth.bcrypt_cost = 4;
    settings.mail.reset_url_base = "http://client.test/reset-password/".to_string();
    settings
}

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_settings(test_settings())
    }

    pub fn with_settings(settings: Settings) -> Self {
        let mailer = Arc::new(RecordingMailer::default());
        let state = AppState::new(settings, Database::reference(), mailer.clone());
        let server = TestServer::new(eventhub::build_router(state.clone())).expect("Failed to start test server");

        Self { server, state, mailer }
    }

    pub fn db(&self) -> &Database {
        &self.state.db
    }

    /// Sign up a fresh regular user through the API
    pub async fn signup_user(&self) -> TestAccount {
        let (first_name, last_name) = random_name();
        let email = random_email();

        let response = self
            .server
            .post("/api/auth/signup")
            .json(&json!({
                "firstName": first_name,
                "lastName": last_name,
                "email": email,
                "password": TEST_PASSWORD,
            }))
            .await;
        response.assert_status(StatusCode::OK);
        let token = response.json::<Value>()["token"].as_str().expect("signup returns a token").to_string();

        let user = self
            .db()
            .fetch_user_by_email(&email)
            .await
            .expect("lookup succeeds")
            .expect("user was stored");

        TestAccount {
            id: user.id,
            email,
            password: TEST_PASSWORD.to_string(),
            token,
        }
    }

    /// Store an admin directly and sign in through the admin login endpoint
    pub async fn create_admin(&self) -> TestAccount {
        let (first_name, last_name) = random_name();
        let email = random_email();
        let hash = bcrypt::hash(TEST_PASSWORD, 4).expect("hashing succeeds");
        let admin = User::new(first_name, last_name, email.clone(), hash, Role::Admin);
        self.db().insert_user(&admin).await.expect("admin stored");

        let response = self
            .server
            .post("/api/auth/admin/login")
            .json(&json!({ "email": email, "password": TEST_PASSWORD }))
            .await;
        response.assert_status(StatusCode::OK);
        let token = response.json::<Value>()["token"].as_str().expect("login returns a token").to_string();

        TestAccount {
            id: admin.id,
            email,
            password: TEST_PASSWORD.to_string(),
            token,
        }
    }

    /// Create an event as `admin`, returning the response body
    pub async fn create_event(&self, admin: &TestAccount, body: Value) -> Value {
        let response = authed(self.server.post("/api/events"), admin).json(&body).await;
        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()
    }

    /// Create a published event with the given capacity and return its id
    pub async fn published_event(&self, admin: &TestAccount, capacity: i32) -> Uuid {
        let body = self
            .create_event(admin, super::test_data::event_body("published", capacity, 0.0))
            .await;
        event_id(&body)
    }

    pub async fn get(&self, path: &str, account: Option<&TestAccount>) -> TestResponse {
        let request = self.server.get(path);
        match account {
            Some(account) => authed(request, account).await,
            None => request.await,
        }
    }

    pub async fn post(&self, path: &str, account: &TestAccount) -> TestResponse {
        authed(self.server.post(path), account).await
    }

    pub async fn register(&self, account: &TestAccount, event: Uuid) -> TestResponse {
        self.post(&format!("/api/events/{}/register", event), account).await
    }

    pub async fn unregister(&self, account: &TestAccount, event: Uuid) -> TestResponse {
        self.post(&format!("/api/events/{}/unregister", event), account).await
    }

    pub async fn event(&self, event: Uuid, account: &TestAccount) -> Value {
        let response = self.get(&format!("/api/events/{}", event), Some(account)).await;
        response.assert_status(StatusCode::OK);
        response.json::<Value>()
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Attach a bearer token to a request
pub fn authed(request: TestRequest, account: &TestAccount) -> TestRequest {
    let value = HeaderValue::from_str(&format!("Bearer {}", account.token)).expect("token is a valid header");
    request.add_header(AUTHORIZATION, value)
}

pub fn event_id(body: &Value) -> Uuid {
    body["id"].as_str().and_then(|id| id.parse().ok()).expect("event body has an id")
}

/// Assert an error response and its machine-readable code
pub fn assert_error(response: &TestResponse, status: StatusCode, code: &str) {
    response.assert_status(status);
    let body = response.json::<Value>();
    assert_eq!(body["code"], code, "unexpected error body: {}", body);
    assert!(body["msg"].is_string(), "error body carries a message: {}", body);
}
