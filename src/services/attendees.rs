//! Attendee roster service
//!
//! Roster entries are admin bookkeeping. They never touch an event's
//! registration relation or its attendee counter.

use chrono::Utc;
use uuid::Uuid;

use crate::database::Database;
use crate::models::attendee::{Attendee, AttendeeQuery, AttendeeStatus, AttendeeWithEvent, CreateAttendeeRequest, UpdateAttendeeRequest};
use crate::services::policy::{authorize, Action, Caller};
use crate::utils::errors::{EventHubError, Result};
use crate::utils::helpers::{is_valid_email, normalize_email, require_field};
use crate::utils::logging::log_admin_action;

fn checked_email(raw: String) -> Result<String> {
    let email = normalize_email(&raw);
    if !is_valid_email(&email) {
        return Err(EventHubError::InvalidInput(format!("Invalid email address: {}", email)));
    }
    Ok(email)
}

#[derive(Clone)]
pub struct AttendeeService {
    db: Database,
}

impl AttendeeService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn admin_id(caller: &Caller) -> Result<Uuid> {
        authorize(caller, Action::ManageAttendees, None).into_result("attendees")?;
        caller.require_id()
    }

    pub async fn list(&self, caller: &Caller, query: AttendeeQuery) -> Result<Vec<AttendeeWithEvent>> {
        Self::admin_id(caller)?;
        self.db.list_attendees(&query).await
    }

    pub async fn create(&self, caller: &Caller, request: CreateAttendeeRequest) -> Result<Attendee> {
        let admin_id = Self::admin_id(caller)?;

        let event = request
            .event
            .ok_or_else(|| EventHubError::InvalidInput("Event is required".to_string()))?;
        let ticket_type = request
            .ticket_type
            .ok_or_else(|| EventHubError::InvalidInput("Ticket type is required".to_string()))?;

        let attendee = Attendee {
            id: Uuid::new_v4(),
            event,
            user: request.user,
            name: require_field(request.name, "Name")?,
            email: checked_email(require_field(request.email, "Email")?)?,
            phone: request.phone,
            company: request.company,
            job_title: request.job_title,
            ticket_type,
            status: request.status.unwrap_or_default(),
            registration_date: Utc::now(),
            dietary: request.dietary,
            notes: request.notes,
        };

        self.db.insert_attendee(&attendee).await?;
        log_admin_action(admin_id, "create_attendee", Some(&attendee.email), Some(&event.to_string()));
        Ok(attendee)
    }

    pub async fn update(&self, caller: &Caller, id: Uuid, mut request: UpdateAttendeeRequest) -> Result<Attendee> {
        let admin_id = Self::admin_id(caller)?;

        if let Some(name) = request.name.take() {
            request.name = Some(require_field(Some(name), "Name")?);
        }
        if let Some(email) = request.email.take() {
            request.email = Some(checked_email(email)?);
        }

        let attendee = self.db.update_attendee(id, &request).await?;
        log_admin_action(admin_id, "update_attendee", Some(&attendee.id.to_string()), None);
        Ok(attendee)
    }

    pub async fn delete(&self, caller: &Caller, id: Uuid) -> Result<()> {
        let admin_id = Self::admin_id(caller)?;

        if !self.db.delete_attendee(id).await? {
            return Err(EventHubError::not_found("Attendee", id));
        }
        log_admin_action(admin_id, "delete_attendee", Some(&id.to_string()), None);
        Ok(())
    }

    pub async fn check_in(&self, caller: &Caller, id: Uuid) -> Result<Attendee> {
        let update = UpdateAttendeeRequest { status: Some(AttendeeStatus::CheckedIn), ..Default::default() };
        self.update(caller, id, update).await
    }

    /// Delete many entries at once; ids that no longer exist are skipped
    pub async fn bulk_delete(&self, caller: &Caller, ids: &[Uuid]) -> Result<u64> {
        let admin_id = Self::admin_id(caller)?;
        if ids.is_empty() {
            return Err(EventHubError::InvalidInput("No attendee ids given".to_string()));
        }

        let deleted = self.db.delete_attendees(ids).await?;
        log_admin_action(admin_id, "bulk_delete_attendees", None, Some(&format!("{} of {}", deleted, ids.len())));
        Ok(deleted)
    }
}
