//! Event listing, visibility and ownership over HTTP

mod helpers;

use axum::http::StatusCode;
use helpers::*;
use serde_json::{json, Value};
use uuid::Uuid;

fn titles(body: &Value) -> Vec<String> {
    body.as_array()
        .expect("listing is an array")
        .iter()
        .map(|e| e["title"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[tokio::test]
async fn test_drafts_hidden_from_anonymous_and_users() {
    let app = TestApp::new();
    let admin = app.create_admin().await;
    let user = app.signup_user().await;

    let draft = app.create_event(&admin, event_body("draft", 10, 0.0)).await;
    let published = app.create_event(&admin, event_body("published", 10, 0.0)).await;

    for account in [None, Some(&user)] {
        let listing = app.get("/api/events", account).await.json::<Value>();
        let ids: Vec<&str> = listing.as_array().unwrap().iter().map(|e| e["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec![published["id"].as_str().unwrap()]);

        let response = app.get(&format!("/api/events/{}", draft["id"].as_str().unwrap()), account).await;
        assert_error(&response, StatusCode::NOT_FOUND, "NOT_FOUND");
    }

    let listing = app.get("/api/events", Some(&admin)).await.json::<Value>();
    assert_eq!(listing.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_status_filter_only_applies_to_admins() {
    let app = TestApp::new();
    let admin = app.create_admin().await;
    let user = app.signup_user().await;

    app.create_event(&admin, event_body("draft", 10, 0.0)).await;
    app.create_event(&admin, event_body("published", 10, 0.0)).await;
    app.create_event(&admin, event_body("cancelled", 10, 0.0)).await;

    let drafts = app.get("/api/events?status=draft", Some(&admin)).await.json::<Value>();
    assert_eq!(drafts.as_array().unwrap().len(), 1);
    assert_eq!(drafts[0]["status"], "draft");

    let everything = app.get("/api/events?status=all", Some(&admin)).await.json::<Value>();
    assert_eq!(everything.as_array().unwrap().len(), 3);

    // A user asking for drafts still only sees published events
    let response = app.get("/api/events?status=draft", Some(&user)).await;
    response.assert_status(StatusCode::OK);
    let listing = response.json::<Value>();
    assert_eq!(listing.as_array().unwrap().len(), 1);
    assert_eq!(listing[0]["status"], "published");

    let response = app.get("/api/events?status=bogus", Some(&admin)).await;
    assert_error(&response, StatusCode::BAD_REQUEST, "VALIDATION");
}

#[tokio::test]
async fn test_search_category_and_sort() {
    let app = TestApp::new();
    let admin = app.create_admin().await;

    let mut cheap = event_body("published", 10, 5.0);
    cheap["title"] = json!("Balboa Basics");
    cheap["category"] = json!("workshop");
    let mut pricey = event_body("published", 10, 40.0);
    pricey["title"] = json!("Blues Weekend");
    pricey["location"] = json!("Old Town Hall");
    let mut free = event_body("published", 10, 0.0);
    free["title"] = json!("Open Practice");
    free["category"] = json!("workshop");

    app.create_event(&admin, pricey).await;
    app.create_event(&admin, cheap).await;
    app.create_event(&admin, free).await;

    let by_price = app.get("/api/events?sortBy=price", None).await.json::<Value>();
    assert_eq!(titles(&by_price), vec!["Open Practice", "Balboa Basics", "Blues Weekend"]);

    let workshops = app.get("/api/events?category=workshop&sortBy=price", None).await.json::<Value>();
    assert_eq!(titles(&workshops), vec!["Open Practice", "Balboa Basics"]);

    let search = app.get("/api/events?search=old%20town", None).await.json::<Value>();
    assert_eq!(titles(&search), vec!["Blues Weekend"]);

    let response = app.get("/api/events?sortBy=nonsense", None).await;
    assert_error(&response, StatusCode::BAD_REQUEST, "VALIDATION");
}

#[tokio::test]
async fn test_create_requires_admin() {
    let app = TestApp::new();
    let user = app.signup_user().await;

    let response = app.server.post("/api/events").json(&event_body("draft", 10, 0.0)).await;
    assert_error(&response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED");

    let response = authed(app.server.post("/api/events"), &user)
        .json(&event_body("draft", 10, 0.0))
        .await;
    assert_error(&response, StatusCode::FORBIDDEN, "FORBIDDEN");
}

#[tokio::test]
async fn test_create_validates_fields() {
    let app = TestApp::new();
    let admin = app.create_admin().await;

    let mut body = event_body("draft", 10, 0.0);
    body["title"] = json!("   ");
    let response = authed(app.server.post("/api/events"), &admin).json(&body).await;
    assert_error(&response, StatusCode::BAD_REQUEST, "VALIDATION");

    let response = authed(app.server.post("/api/events"), &admin)
        .json(&event_body("draft", 10, -1.0))
        .await;
    assert_error(&response, StatusCode::BAD_REQUEST, "VALIDATION");

    let response = authed(app.server.post("/api/events"), &admin)
        .json(&event_body("draft", -5, 0.0))
        .await;
    assert_error(&response, StatusCode::BAD_REQUEST, "VALIDATION");

    let created = app.create_event(&admin, event_body("draft", 10, 0.0)).await;
    assert_eq!(created["currentAttendees"], 0);
    assert_eq!(created["attendees"], json!([]));
    assert_eq!(created["user"], admin.id.to_string());
}

#[tokio::test]
async fn test_only_owner_may_update_or_delete() {
    let app = TestApp::new();
    let owner = app.create_admin().await;
    let other_admin = app.create_admin().await;
    let user = app.signup_user().await;

    let event = app.published_event(&owner, 10).await;
    let path = format!("/api/events/{}", event);

    let response = authed(app.server.put(&path), &other_admin)
        .json(&json!({ "title": "Hijacked" }))
        .await;
    assert_error(&response, StatusCode::NOT_FOUND, "NOT_FOUND");

    let response = authed(app.server.delete(&path), &other_admin).await;
    assert_error(&response, StatusCode::NOT_FOUND, "NOT_FOUND");

    let response = authed(app.server.put(&path), &user).json(&json!({ "title": "Hijacked" })).await;
    assert_error(&response, StatusCode::FORBIDDEN, "FORBIDDEN");

    let response = app.server.delete(&path).await;
    assert_error(&response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED");

    let response = authed(app.server.put(&path), &owner)
        .json(&json!({ "title": "Lindy Hop Social (moved)", "price": 12.5 }))
        .await;
    response.assert_status(StatusCode::OK);
    let updated = response.json::<Value>();
    assert_eq!(updated["title"], "Lindy Hop Social (moved)");
    assert_eq!(updated["price"], 12.5);

    let response = authed(app.server.delete(&path), &owner).await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.json::<Value>()["msg"], "Event removed");

    let response = app.get(&path, Some(&owner)).await;
    assert_error(&response, StatusCode::NOT_FOUND, "NOT_FOUND");
}

#[tokio::test]
async fn test_users_cannot_tell_drafts_from_missing_ids() {
    let app = TestApp::new();
    let admin = app.create_admin().await;
    let user = app.signup_user().await;
    let draft = event_id(&app.create_event(&admin, event_body("draft", 10, 0.0)).await);

    for id in [draft.to_string(), Uuid::new_v4().to_string(), "not-a-uuid".to_string()] {
        let path = format!("/api/events/{}", id);

        let response = authed(app.server.put(&path), &user).json(&json!({ "title": "Hijacked" })).await;
        assert_error(&response, StatusCode::FORBIDDEN, "FORBIDDEN");

        let response = authed(app.server.delete(&path), &user).await;
        assert_error(&response, StatusCode::FORBIDDEN, "FORBIDDEN");

        let response = authed(app.server.post(&format!("{}/duplicate", path)), &user).await;
        assert_error(&response, StatusCode::FORBIDDEN, "FORBIDDEN");

        let response = app.server.post(&format!("{}/duplicate", path)).await;
        assert_error(&response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED");
    }

    let response = app.get(&format!("/api/events/{}", draft), Some(&user)).await;
    assert_error(&response, StatusCode::NOT_FOUND, "NOT_FOUND");
    let response = app.get(&format!("/api/events/{}", Uuid::new_v4()), Some(&user)).await;
    assert_error(&response, StatusCode::NOT_FOUND, "NOT_FOUND");
}

#[tokio::test]
async fn test_status_transitions() {
    let app = TestApp::new();
    let admin = app.create_admin().await;
    let created = app.create_event(&admin, event_body("draft", 10, 0.0)).await;
    let path = format!("/api/events/{}", event_id(&created));

    let response = authed(app.server.put(&path), &admin).json(&json!({ "status": "completed" })).await;
    assert_error(&response, StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION");

    for status in ["published", "ongoing", "completed"] {
        let response = authed(app.server.put(&path), &admin).json(&json!({ "status": status })).await;
        response.assert_status(StatusCode::OK);
        assert_eq!(response.json::<Value>()["status"], status);
    }

    let response = authed(app.server.put(&path), &admin).json(&json!({ "status": "cancelled" })).await;
    assert_error(&response, StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION");
}

#[tokio::test]
async fn test_capacity_cannot_drop_below_registrations() {
    let app = TestApp::new();
    let admin = app.create_admin().await;
    let event = app.published_event(&admin, 3).await;

    for _ in 0..2 {
        let user = app.signup_user().await;
        app.register(&user, event).await.assert_status(StatusCode::OK);
    }

    let path = format!("/api/events/{}", event);
    let response = authed(app.server.put(&path), &admin).json(&json!({ "capacity": 1 })).await;
    assert_error(&response, StatusCode::BAD_REQUEST, "VALIDATION");

    let response = authed(app.server.put(&path), &admin).json(&json!({ "capacity": 2 })).await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.json::<Value>()["capacity"], 2);
}

#[tokio::test]
async fn test_duplicate_creates_empty_draft() {
    let app = TestApp::new();
    let owner = app.create_admin().await;
    let copier = app.create_admin().await;
    let event = app.published_event(&owner, 5).await;

    let user = app.signup_user().await;
    app.register(&user, event).await.assert_status(StatusCode::OK);

    let response = app.post(&format!("/api/events/{}/duplicate", event), &copier).await;
    response.assert_status(StatusCode::CREATED);
    let copy = response.json::<Value>();

    assert_ne!(copy["id"], event.to_string());
    assert_eq!(copy["status"], "draft");
    assert_eq!(copy["currentAttendees"], 0);
    assert_eq!(copy["attendees"], json!([]));
    assert_eq!(copy["user"], copier.id.to_string());
    assert_eq!(copy["title"], "Lindy Hop Social");

    let original = app.event(event, &owner).await;
    assert_eq!(original["currentAttendees"], 1);
}

#[tokio::test]
async fn test_malformed_id_is_not_found() {
    let app = TestApp::new();
    let response = app.get("/api/events/not-a-uuid", None).await;
    assert_error(&response, StatusCode::NOT_FOUND, "NOT_FOUND");
}

#[tokio::test]
async fn test_invalid_token_is_anonymous_on_public_routes() {
    let app = TestApp::new();
    let admin = app.create_admin().await;
    app.create_event(&admin, event_body("draft", 10, 0.0)).await;

    let mut forged = admin.clone();
    forged.token = "not.a.jwt".to_string();

    let response = app.get("/api/events", Some(&forged)).await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!([]));

    let response = app.get("/api/profile/me", Some(&forged)).await;
    assert_error(&response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED");
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = TestApp::new();
    let response = app.server.get("/health").await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.json::<Value>()["databaseHealthy"], true);
}
