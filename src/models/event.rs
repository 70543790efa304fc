//! Event model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::errors::{EventHubError, Result};
use crate::utils::helpers::filter_value;

text_enum! {
    /// Event lifecycle status
    #[derive(Default)]
    pub enum EventStatus {
        #[default]
        Draft => "draft",
        Published => "published",
        Ongoing => "ongoing",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

impl EventStatus {
    /// Completed and cancelled events never change status again
    pub fn is_terminal(&self) -> bool {
        matches!(self, EventStatus::Completed | EventStatus::Cancelled)
    }

    /// Whether an admin may move an event from `self` to `next`
    pub fn can_transition_to(&self, next: EventStatus) -> bool {
        use EventStatus::*;

        if *self == next {
            return true;
        }

        match (self, next) {
            (_, Cancelled) => !self.is_terminal(),
            (Draft, Published) | (Published, Ongoing) | (Ongoing, Completed) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    /// Owning admin
    pub user: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub date: DateTime<Utc>,
    pub price: f64,
    pub capacity: i32,
    pub status: EventStatus,
    pub current_attendees: i32,
    /// Registered users, most recent first
    pub attendees: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn is_full(&self) -> bool {
        self.current_attendees >= self.capacity
    }

    /// Decide whether one more user may register.
    ///
    /// Drivers call this inside the same atomic unit that writes the
    /// registration, with `already_registered` read from the relation.
    pub fn check_admission(&self, already_registered: bool) -> Result<()> {
        if self.status != EventStatus::Published {
            return Err(EventHubError::EventNotOpen { event_id: self.id, status: self.status });
        }
        if self.is_full() {
            return Err(EventHubError::CapacityExceeded { event_id: self.id });
        }
        if already_registered {
            return Err(EventHubError::AlreadyRegistered { event_id: self.id });
        }
        Ok(())
    }

    /// Apply an admin edit, enforcing lifecycle and capacity rules
    pub fn apply_update(&mut self, update: &UpdateEventRequest) -> Result<()> {
        if let Some(status) = update.status {
            if !self.status.can_transition_to(status) {
                return Err(EventHubError::InvalidStateTransition { from: self.status, to: status });
            }
        }
        if let Some(capacity) = update.capacity {
            if capacity < self.current_attendees {
                return Err(EventHubError::InvalidInput(format!(
                    "Capacity cannot be lower than the {} registered attendees",
                    self.current_attendees
                )));
            }
        }

        if let Some(ref title) = update.title {
            self.title = title.clone();
        }
        if let Some(ref description) = update.description {
            self.description = description.clone();
        }
        if let Some(ref category) = update.category {
            self.category = category.clone();
        }
        if let Some(ref location) = update.location {
            self.location = location.clone();
        }
        if let Some(date) = update.date {
            self.date = date;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(capacity) = update.capacity {
            self.capacity = capacity;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        Ok(())
    }

    /// Fresh draft copy of this event's descriptive fields owned by `owner`
    pub fn duplicate_for(&self, owner: Uuid) -> Event {
        Event {
            id: Uuid::new_v4(),
            user: owner,
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            location: self.location.clone(),
            date: self.date,
            price: self.price,
            capacity: self.capacity,
            status: EventStatus::Draft,
            current_attendees: 0,
            attendees: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub price: Option<f64>,
    pub capacity: Option<i32>,
    pub status: Option<EventStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub price: Option<f64>,
    pub capacity: Option<i32>,
    pub status: Option<EventStatus>,
}

/// Ordering of event listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSort {
    /// Ascending by event date
    #[default]
    Date,
    /// Ascending by price
    Price,
    /// Descending by current attendees
    Popularity,
}

/// Which statuses a listing may contain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    PublishedOnly,
    All { status: Option<EventStatus> },
}

/// Event listing query. Construct through [`EventQuery::public`] or
/// [`EventQuery::admin`]; the visibility field is what the caller is allowed to see.
#[derive(Debug, Clone, PartialEq)]
pub struct EventQuery {
    pub visibility: Visibility,
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort: EventSort,
}

impl EventQuery {
    /// Listing for anonymous callers and regular users
    pub fn public(search: Option<String>, category: Option<String>, sort: EventSort) -> Self {
        Self {
            visibility: Visibility::PublishedOnly,
            search: filter_value(search),
            category: filter_value(category),
            sort,
        }
    }

    /// Listing for admins, optionally narrowed to one status
    pub fn admin(search: Option<String>, category: Option<String>, sort: EventSort, status: Option<EventStatus>) -> Self {
        Self {
            visibility: Visibility::All { status },
            search: filter_value(search),
            category: filter_value(category),
            sort,
        }
    }

    /// In-memory evaluation of the filter part of the query
    pub fn matches(&self, event: &Event) -> bool {
        let visible = match self.visibility {
            Visibility::PublishedOnly => event.status == EventStatus::Published,
            Visibility::All { status: Some(status) } => event.status == status,
            Visibility::All { status: None } => true,
        };
        if !visible {
            return false;
        }

        if let Some(ref category) = self.category {
            if &event.category != category {
                return false;
            }
        }

        match self.search {
            Some(ref needle) => {
                let needle = needle.to_lowercase();
                [&event.title, &event.description, &event.location]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            }
            None => true,
        }
    }

    /// In-memory ordering matching the SQL `ORDER BY`
    pub fn sort_events(&self, events: &mut [Event]) {
        match self.sort {
            EventSort::Date => events.sort_by(|a, b| a.date.cmp(&b.date)),
            EventSort::Price => events.sort_by(|a, b| a.price.total_cmp(&b.price).then(a.date.cmp(&b.date))),
            EventSort::Popularity => events.sort_by(|a, b| {
                b.current_attendees.cmp(&a.current_attendees).then(a.date.cmp(&b.date))
            }),
        }
    }
}
