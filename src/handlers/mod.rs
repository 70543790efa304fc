//! HTTP handlers
//!
//! Handlers translate requests into service calls; all decisions are made in
//! the services. Rejections from body and query parsing are reported through
//! [`EventHubError`] so every error has the same `{code, msg}` shape.

pub mod attendees;
pub mod auth;
pub mod dashboard;
pub mod events;
pub mod profile;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Query, Request, State},
    http::{request::Parts, StatusCode},
    response::IntoResponse,
    routing::{get, patch, post, put},
    Json, Router,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::middleware::{cors_layer, trace_layer};
use crate::state::AppState;
use crate::utils::errors::EventHubError;

/// JSON body whose rejection is reported as a validation error
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = EventHubError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(EventHubError::InvalidInput(rejection.body_text())),
        }
    }
}

/// Query string whose rejection is reported as a validation error
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = EventHubError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(EventHubError::InvalidInput(rejection.body_text())),
        }
    }
}

/// `{ "msg": ... }` confirmation body
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub msg: String,
}

impl MessageResponse {
    pub fn new(msg: impl Into<String>) -> Json<Self> {
        Json(Self { msg: msg.into() })
    }
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.services.health_check().await;
    let code = if status.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(status))
}

/// Build the application router with all routes and layers
pub fn build_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/admin/login", post(auth::admin_login))
        .route("/admin/create", post(auth::create_admin))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password/:token", patch(auth::reset_password));

    let event_routes = Router::new()
        .route("/", get(events::list_events).post(events::create_event))
        .route(
            "/:id",
            get(events::get_event).put(events::update_event).delete(events::delete_event),
        )
        .route("/:id/duplicate", post(events::duplicate_event))
        .route("/:id/register", post(events::register))
        .route("/:id/unregister", post(events::unregister));

    let profile_routes = Router::new()
        .route("/me", get(profile::get_profile).put(profile::update_profile))
        .route("/my-events", get(profile::my_events))
        .route("/dashboard-stats", get(profile::dashboard_stats));

    let attendee_routes = Router::new()
        .route("/", get(attendees::list_attendees).post(attendees::create_attendee))
        .route("/bulk-delete", post(attendees::bulk_delete))
        .route(
            "/:id",
            put(attendees::update_attendee).delete(attendees::delete_attendee),
        )
        .route("/:id/checkin", patch(attendees::check_in));

    let dashboard_routes = Router::new().route("/stats", get(dashboard::admin_stats));

    let cors = cors_layer(&state.settings.server);

    Router::new()
        .route("/health", get(health))
        .nest("/api/auth", auth_routes)
        .nest("/api/events", event_routes)
        .nest("/api/profile", profile_routes)
        .nest("/api/attendees", attendee_routes)
        .nest("/api/dashboard", dashboard_routes)
        .layer(trace_layer())
        .layer(cors)
        .with_state(state)
}
