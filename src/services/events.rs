//! Event service implementation
//!
//! Listing, reading and admin management of events. Every entry point runs
//! the caller through the authorization policy before touching storage.

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::database::Database;
use crate::models::event::{CreateEventRequest, Event, EventSort, EventStatus, UpdateEventRequest};
use crate::services::policy::{authorize, event_query_for, require_admin, Action, Caller};
use crate::utils::errors::{EventHubError, Result};
use crate::utils::helpers::require_field;
use crate::utils::logging::log_event_action;

/// Listing parameters as received from the client
#[derive(Debug, Clone, Default)]
pub struct EventListParams {
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort: EventSort,
    pub status: Option<EventStatus>,
}

fn validate_price(price: f64) -> Result<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(EventHubError::InvalidInput("Price must be zero or more".to_string()));
    }
    Ok(())
}

fn validate_capacity(capacity: i32) -> Result<()> {
    if capacity < 0 {
        return Err(EventHubError::InvalidInput("Capacity must be zero or more".to_string()));
    }
    Ok(())
}

fn non_blank(value: &Option<String>, field: &str) -> Result<()> {
    match value {
        Some(v) if v.trim().is_empty() => Err(EventHubError::InvalidInput(format!("{} cannot be empty", field))),
        _ => Ok(()),
    }
}

/// Event service
#[derive(Clone)]
pub struct EventService {
    db: Database,
}

impl EventService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    async fn load(&self, id: Uuid) -> Result<Event> {
        self.db
            .fetch_event(id)
            .await?
            .ok_or_else(|| EventHubError::not_found("Event", id))
    }

    /// Events visible to the caller
    pub async fn list(&self, caller: &Caller, params: EventListParams) -> Result<Vec<Event>> {
        let query = event_query_for(caller, params.search, params.category, params.sort, params.status);
        debug!(?query, "Listing events");
        self.db.list_events(&query).await
    }

    /// A single event, if the caller may see it
    pub async fn get(&self, caller: &Caller, id: Uuid) -> Result<Event> {
        let event = self.load(id).await?;
        authorize(caller, Action::ReadEvent, Some(&event)).into_result(id)?;
        Ok(event)
    }

    pub async fn create(&self, caller: &Caller, request: CreateEventRequest) -> Result<Event> {
        authorize(caller, Action::CreateEvent, None).into_result("new")?;
        let owner = caller.require_id()?;

        let price = request.price.unwrap_or(0.0);
        validate_price(price)?;
        let capacity = request
            .capacity
            .ok_or_else(|| EventHubError::InvalidInput("Capacity is required".to_string()))?;
        validate_capacity(capacity)?;
        let date = request
            .date
            .ok_or_else(|| EventHubError::InvalidInput("Date is required".to_string()))?;

        let event = Event {
            id: Uuid::new_v4(),
            user: owner,
            title: require_field(request.title, "Title")?,
            description: request.description.map(|d| d.trim().to_string()).unwrap_or_default(),
            category: require_field(request.category, "Category")?,
            location: require_field(request.location, "Location")?,
            date,
            price,
            capacity,
            status: request.status.unwrap_or_default(),
            current_attendees: 0,
            attendees: Vec::new(),
            created_at: Utc::now(),
        };

        self.db.insert_event(&event).await?;
        log_event_action(event.id, "create", owner, Some(&event.title));
        Ok(event)
    }

    /// Apply an owner's edit
    pub async fn update(&self, caller: &Caller, id: Uuid, request: UpdateEventRequest) -> Result<Event> {
        require_admin(caller).into_result(id)?;
        let current = self.load(id).await?;
        authorize(caller, Action::UpdateEvent, Some(&current)).into_result(id)?;
        let admin_id = caller.require_id()?;

        non_blank(&request.title, "Title")?;
        non_blank(&request.category, "Category")?;
        non_blank(&request.location, "Location")?;
        if let Some(price) = request.price {
            validate_price(price)?;
        }
        if let Some(capacity) = request.capacity {
            validate_capacity(capacity)?;
        }

        let updated = self.db.update_event(id, &request).await?;
        log_event_action(id, "update", admin_id, request.status.map(|s| s.as_str()));
        Ok(updated)
    }

    /// Delete an owned event together with its registrations and roster
    pub async fn delete(&self, caller: &Caller, id: Uuid) -> Result<()> {
        require_admin(caller).into_result(id)?;
        let current = self.load(id).await?;
        authorize(caller, Action::DeleteEvent, Some(&current)).into_result(id)?;
        let admin_id = caller.require_id()?;

        if !self.db.delete_event(id).await? {
            return Err(EventHubError::not_found("Event", id));
        }
        log_event_action(id, "delete", admin_id, Some(&current.title));
        Ok(())
    }

    /// Copy an event into a fresh draft owned by the caller
    pub async fn duplicate(&self, caller: &Caller, id: Uuid) -> Result<Event> {
        require_admin(caller).into_result(id)?;
        let source = self.load(id).await?;
        authorize(caller, Action::DuplicateEvent, Some(&source)).into_result(id)?;
        let admin_id = caller.require_id()?;

        let copy = source.duplicate_for(admin_id);
        self.db.insert_event(&copy).await?;
        log_event_action(copy.id, "duplicate", admin_id, Some(&source.id.to_string()));
        Ok(copy)
    }
}
