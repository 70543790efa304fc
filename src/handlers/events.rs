//! Event endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::handlers::{ApiJson, ApiQuery, MessageResponse};
use crate::middleware::{AuthUser, MaybeAuthUser, RequireAdmin};
use crate::models::event::{CreateEventRequest, Event, EventSort, EventStatus, UpdateEventRequest};
use crate::services::EventListParams;
use crate::state::AppState;
use crate::utils::errors::Result;
use crate::utils::helpers::{filter_value, parse_id};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort_by: Option<EventSort>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub msg: String,
    pub event_id: Uuid,
}

pub async fn list_events(
    State(state): State<AppState>,
    auth: MaybeAuthUser,
    ApiQuery(query): ApiQuery<EventListQuery>,
) -> Result<Json<Vec<Event>>> {
    let caller = auth.caller();

    // Non-admins never filter by status, so a bad value is only an error for admins
    let status = match filter_value(query.status) {
        Some(raw) if caller.is_admin() => Some(raw.parse::<EventStatus>()?),
        _ => None,
    };

    let params = EventListParams {
        search: query.search,
        category: query.category,
        sort: query.sort_by.unwrap_or_default(),
        status,
    };
    Ok(Json(state.services.event_service.list(&caller, params).await?))
}

pub async fn get_event(
    State(state): State<AppState>,
    auth: MaybeAuthUser,
    Path(id): Path<String>,
) -> Result<Json<Event>> {
    let id = parse_id(&id, "Event")?;
    Ok(Json(state.services.event_service.get(&auth.caller(), id).await?))
}

pub async fn create_event(
    State(state): State<AppState>,
    admin: RequireAdmin,
    ApiJson(request): ApiJson<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>)> {
    let event = state.services.event_service.create(&admin.caller(), request).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn update_event(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateEventRequest>,
) -> Result<Json<Event>> {
    let id = parse_id(&id, "Event")?;
    Ok(Json(state.services.event_service.update(&admin.caller(), id, request).await?))
}

pub async fn delete_event(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let id = parse_id(&id, "Event")?;
    state.services.event_service.delete(&admin.caller(), id).await?;
    Ok(MessageResponse::new("Event removed"))
}

pub async fn duplicate_event(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<Event>)> {
    let id = parse_id(&id, "Event")?;
    let copy = state.services.event_service.duplicate(&admin.caller(), id).await?;
    Ok((StatusCode::CREATED, Json(copy)))
}

pub async fn register(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<RegistrationResponse>> {
    let id = parse_id(&id, "Event")?;
    let event = state.services.registration_service.register(&auth.caller(), id).await?;
    Ok(Json(RegistrationResponse {
        msg: "Successfully registered for event".to_string(),
        event_id: event.id,
    }))
}

pub async fn unregister(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<RegistrationResponse>> {
    let id = parse_id(&id, "Event")?;
    let event = state.services.registration_service.unregister(&auth.caller(), id).await?;
    Ok(Json(RegistrationResponse {
        msg: "Successfully unregistered from event".to_string(),
        event_id: event.id,
    }))
}
