//! Attendee model
//!
//! Attendees are roster entries managed by admins (walk-ins, ticket holders).
//! They are separate from users who registered themselves for an event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

text_enum! {
    pub enum TicketType {
        Vip => "VIP",
        Regular => "Regular",
        Student => "Student",
        Staff => "Staff",
    }
}

text_enum! {
    #[derive(Default)]
    pub enum AttendeeStatus {
        Confirmed => "confirmed",
        #[default]
        Pending => "pending",
        Cancelled => "cancelled",
        CheckedIn => "checked-in",
    }
}

impl AttendeeStatus {
    /// Statuses that count towards revenue
    pub fn is_paid(&self) -> bool {
        matches!(self, AttendeeStatus::Confirmed | AttendeeStatus::CheckedIn)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    pub id: Uuid,
    pub event: Uuid,
    pub user: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub ticket_type: TicketType,
    pub status: AttendeeStatus,
    pub registration_date: DateTime<Utc>,
    pub dietary: Option<String>,
    pub notes: Option<String>,
}

impl Attendee {
    pub fn apply_update(&mut self, update: &UpdateAttendeeRequest) {
        if let Some(ref name) = update.name {
            self.name = name.clone();
        }
        if let Some(ref email) = update.email {
            self.email = email.clone();
        }
        if update.phone.is_some() {
            self.phone = update.phone.clone();
        }
        if update.company.is_some() {
            self.company = update.company.clone();
        }
        if update.job_title.is_some() {
            self.job_title = update.job_title.clone();
        }
        if let Some(ticket_type) = update.ticket_type {
            self.ticket_type = ticket_type;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if update.dietary.is_some() {
            self.dietary = update.dietary.clone();
        }
        if update.notes.is_some() {
            self.notes = update.notes.clone();
        }
    }
}

/// Roster entry with the title of its event, as listed to admins
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeWithEvent {
    #[serde(flatten)]
    pub attendee: Attendee,
    pub event_title: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAttendeeRequest {
    pub event: Option<Uuid>,
    pub user: Option<Uuid>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub ticket_type: Option<TicketType>,
    pub status: Option<AttendeeStatus>,
    pub dietary: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAttendeeRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub ticket_type: Option<TicketType>,
    pub status: Option<AttendeeStatus>,
    pub dietary: Option<String>,
    pub notes: Option<String>,
}

/// Roster listing filters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttendeeQuery {
    pub search: Option<String>,
    pub status: Option<AttendeeStatus>,
    pub ticket_type: Option<TicketType>,
    pub event_id: Option<Uuid>,
}

impl AttendeeQuery {
    pub fn matches(&self, attendee: &Attendee) -> bool {
        if self.status.is_some_and(|s| s != attendee.status) {
            return false;
        }
        if self.ticket_type.is_some_and(|t| t != attendee.ticket_type) {
            return false;
        }
        if self.event_id.is_some_and(|e| e != attendee.event) {
            return false;
        }

        match self.search {
            Some(ref needle) => {
                let needle = needle.to_lowercase();
                let company = attendee.company.as_deref().unwrap_or_default();
                [attendee.name.as_str(), attendee.email.as_str(), company]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            }
            None => true,
        }
    }
}
