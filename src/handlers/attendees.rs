//! Attendee roster endpoints (admin only)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::handlers::{ApiJson, ApiQuery, MessageResponse};
use crate::middleware::RequireAdmin;
use crate::models::attendee::{Attendee, AttendeeQuery, AttendeeWithEvent, CreateAttendeeRequest, UpdateAttendeeRequest};
use crate::state::AppState;
use crate::utils::errors::{EventHubError, Result};
use crate::utils::helpers::{filter_value, parse_id};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeListQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub ticket_type: Option<String>,
    pub event_id: Option<String>,
}

impl AttendeeListQuery {
    fn into_query(self) -> Result<AttendeeQuery> {
        let event_id = filter_value(self.event_id)
            .map(|raw| {
                Uuid::parse_str(&raw).map_err(|_| EventHubError::InvalidInput(format!("Invalid eventId: {}", raw)))
            })
            .transpose()?;

        Ok(AttendeeQuery {
            search: filter_value(self.search),
            status: filter_value(self.status).map(|s| s.parse()).transpose()?,
            ticket_type: filter_value(self.ticket_type).map(|t| t.parse()).transpose()?,
            event_id,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct BulkDeleteResponse {
    pub msg: String,
    pub deleted: u64,
}

pub async fn list_attendees(
    State(state): State<AppState>,
    admin: RequireAdmin,
    ApiQuery(query): ApiQuery<AttendeeListQuery>,
) -> Result<Json<Vec<AttendeeWithEvent>>> {
    let query = query.into_query()?;
    Ok(Json(state.services.attendee_service.list(&admin.caller(), query).await?))
}

pub async fn create_attendee(
    State(state): State<AppState>,
    admin: RequireAdmin,
    ApiJson(request): ApiJson<CreateAttendeeRequest>,
) -> Result<(StatusCode, Json<Attendee>)> {
    let attendee = state.services.attendee_service.create(&admin.caller(), request).await?;
    Ok((StatusCode::CREATED, Json(attendee)))
}

pub async fn update_attendee(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateAttendeeRequest>,
) -> Result<Json<Attendee>> {
    let id = parse_id(&id, "Attendee")?;
    Ok(Json(state.services.attendee_service.update(&admin.caller(), id, request).await?))
}

pub async fn delete_attendee(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let id = parse_id(&id, "Attendee")?;
    state.services.attendee_service.delete(&admin.caller(), id).await?;
    Ok(MessageResponse::new("Attendee removed"))
}

pub async fn check_in(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<Attendee>> {
    let id = parse_id(&id, "Attendee")?;
    Ok(Json(state.services.attendee_service.check_in(&admin.caller(), id).await?))
}

pub async fn bulk_delete(
    State(state): State<AppState>,
    admin: RequireAdmin,
    ApiJson(request): ApiJson<BulkDeleteRequest>,
) -> Result<Json<BulkDeleteResponse>> {
    let deleted = state.services.attendee_service.bulk_delete(&admin.caller(), &request.ids).await?;
    Ok(Json(BulkDeleteResponse {
        msg: "Attendees removed successfully".to_string(),
        deleted,
    }))
}
