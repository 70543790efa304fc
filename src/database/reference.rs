//! In-memory reference driver
//!
//! Every collection sits behind one lock so that each operation, including
//! registration, observes and mutates a consistent snapshot.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::lock::Mutex;
use uuid::Uuid;

use crate::models::attendee::{Attendee, AttendeeQuery, AttendeeWithEvent, UpdateAttendeeRequest};
use crate::models::event::{Event, EventQuery, UpdateEventRequest};
use crate::models::user::User;
use crate::utils::errors::{EventHubError, Result};
use super::repositories::{AbstractAttendees, AbstractEvents, AbstractUsers};

#[derive(Debug, Clone)]
struct Registration {
    event_id: Uuid,
    user_id: Uuid,
}

#[derive(Debug, Default)]
struct ReferenceState {
    users: HashMap<Uuid, User>,
    events: HashMap<Uuid, Event>,
    /// Appended in registration order
    registrations: Vec<Registration>,
    attendees: HashMap<Uuid, Attendee>,
}

impl ReferenceState {
    fn is_registered(&self, event_id: Uuid, user_id: Uuid) -> bool {
        self.registrations
            .iter()
            .any(|r| r.event_id == event_id && r.user_id == user_id)
    }

    /// Event with its attendee projection filled in, most recent first
    fn hydrate(&self, event: &Event) -> Event {
        let mut event = event.clone();
        event.attendees = self
            .registrations
            .iter()
            .rev()
            .filter(|r| r.event_id == event.id)
            .map(|r| r.user_id)
            .collect();
        event
    }

    fn hydrated(&self, id: Uuid) -> Result<Event> {
        self.events
            .get(&id)
            .map(|event| self.hydrate(event))
            .ok_or_else(|| EventHubError::not_found("Event", id))
    }

    fn email_taken(&self, email: &str, except: Uuid) -> bool {
        self.users.values().any(|u| u.id != except && u.email == email)
    }

    fn roster_email_taken(&self, event_id: Uuid, email: &str, except: Uuid) -> bool {
        self.attendees
            .values()
            .any(|a| a.id != except && a.event == event_id && a.email == email)
    }
}

/// Reference implementation
#[derive(Debug, Clone, Default)]
pub struct ReferenceDb {
    state: Arc<Mutex<ReferenceState>>,
}

#[async_trait]
impl AbstractUsers for ReferenceDb {
    async fn insert_user(&self, user: &User) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.email_taken(&user.email, user.id) {
            return Err(EventHubError::DuplicateEmail { email: user.email.clone() });
        }
        state.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn fetch_user(&self, id: Uuid) -> Result<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.get(&id).cloned())
    }

    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn fetch_user_by_reset_token(&self, token_hash: &str, now: DateTime<Utc>) -> Result<Option<User>> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .find(|u| {
                u.reset_password_token.as_deref() == Some(token_hash)
                    && u.reset_password_expires.is_some_and(|expires| expires > now)
            })
            .cloned())
    }

    async fn save_user(&self, user: &User) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.users.contains_key(&user.id) {
            return Err(EventHubError::not_found("User", user.id));
        }
        if state.email_taken(&user.email, user.id) {
            return Err(EventHubError::DuplicateEmail { email: user.email.clone() });
        }
        state.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn registered_event_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        let state = self.state.lock().await;
        Ok(state
            .registrations
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.event_id)
            .collect())
    }

    async fn organized_event_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        let state = self.state.lock().await;
        let mut owned: Vec<&Event> = state.events.values().filter(|e| e.user == user_id).collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned.into_iter().map(|e| e.id).collect())
    }
}

#[async_trait]
impl AbstractEvents for ReferenceDb {
    async fn insert_event(&self, event: &Event) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.users.contains_key(&event.user) {
            return Err(EventHubError::not_found("User", event.user));
        }
        state.events.insert(event.id, event.clone());
        Ok(())
    }

    async fn fetch_event(&self, id: Uuid) -> Result<Option<Event>> {
        let state = self.state.lock().await;
        Ok(state.events.get(&id).map(|event| state.hydrate(event)))
    }

    async fn list_events(&self, query: &EventQuery) -> Result<Vec<Event>> {
        let state = self.state.lock().await;
        let mut events: Vec<Event> = state
            .events
            .values()
            .filter(|event| query.matches(event))
            .map(|event| state.hydrate(event))
            .collect();

        // Stable base order before the requested sort
        events.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        query.sort_events(&mut events);
        Ok(events)
    }

    async fn update_event(&self, id: Uuid, update: &UpdateEventRequest) -> Result<Event> {
        let mut state = self.state.lock().await;
        let event = state
            .events
            .get_mut(&id)
            .ok_or_else(|| EventHubError::not_found("Event", id))?;

        event.apply_update(update)?;
        state.hydrated(id)
    }

    async fn delete_event(&self, id: Uuid) -> Result<bool> {
        let mut state = self.state.lock().await;
        if state.events.remove(&id).is_none() {
            return Ok(false);
        }
        state.registrations.retain(|r| r.event_id != id);
        state.attendees.retain(|_, a| a.event != id);
        Ok(true)
    }

    async fn count_events(&self) -> Result<i64> {
        let state = self.state.lock().await;
        Ok(state.events.len() as i64)
    }

    async fn recent_events(&self, limit: i64) -> Result<Vec<Event>> {
        let state = self.state.lock().await;
        let mut events: Vec<&Event> = state.events.values().collect();
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(events
            .into_iter()
            .take(limit.max(0) as usize)
            .map(|event| state.hydrate(event))
            .collect())
    }

    async fn registered_events(&self, user_id: Uuid) -> Result<Vec<Event>> {
        let state = self.state.lock().await;
        Ok(state
            .registrations
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .filter_map(|r| state.events.get(&r.event_id))
            .map(|event| state.hydrate(event))
            .collect())
    }

    async fn register_attendee(&self, event_id: Uuid, user_id: Uuid) -> Result<Event> {
        let mut state = self.state.lock().await;

        if !state.events.contains_key(&event_id) {
            return Err(EventHubError::not_found("Event", event_id));
        }
        if !state.users.contains_key(&user_id) {
            return Err(EventHubError::not_found("User", user_id));
        }

        let already_registered = state.is_registered(event_id, user_id);
        let event = state
            .events
            .get_mut(&event_id)
            .ok_or_else(|| EventHubError::not_found("Event", event_id))?;
        event.check_admission(already_registered)?;
        event.current_attendees += 1;

        state.registrations.push(Registration { event_id, user_id });
        state.hydrated(event_id)
    }

    async fn unregister_attendee(&self, event_id: Uuid, user_id: Uuid) -> Result<Event> {
        let mut state = self.state.lock().await;

        if !state.events.contains_key(&event_id) {
            return Err(EventHubError::not_found("Event", event_id));
        }

        let position = state
            .registrations
            .iter()
            .position(|r| r.event_id == event_id && r.user_id == user_id)
            .ok_or(EventHubError::NotRegistered { event_id })?;
        state.registrations.remove(position);

        if let Some(event) = state.events.get_mut(&event_id) {
            event.current_attendees = (event.current_attendees - 1).max(0);
        }
        state.hydrated(event_id)
    }
}

#[async_trait]
impl AbstractAttendees for ReferenceDb {
    async fn insert_attendee(&self, attendee: &Attendee) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.events.contains_key(&attendee.event) {
            return Err(EventHubError::not_found("Event", attendee.event));
        }
        if let Some(user) = attendee.user {
            if !state.users.contains_key(&user) {
                return Err(EventHubError::not_found("User", user));
            }
        }
        if state.roster_email_taken(attendee.event, &attendee.email, attendee.id) {
            return Err(EventHubError::DuplicateAttendee { email: attendee.email.clone() });
        }
        state.attendees.insert(attendee.id, attendee.clone());
        Ok(())
    }

    async fn fetch_attendee(&self, id: Uuid) -> Result<Option<Attendee>> {
        let state = self.state.lock().await;
        Ok(state.attendees.get(&id).cloned())
    }

    async fn list_attendees(&self, query: &AttendeeQuery) -> Result<Vec<AttendeeWithEvent>> {
        let state = self.state.lock().await;
        let mut listed: Vec<AttendeeWithEvent> = state
            .attendees
            .values()
            .filter(|a| query.matches(a))
            .filter_map(|a| {
                state.events.get(&a.event).map(|event| AttendeeWithEvent {
                    attendee: a.clone(),
                    event_title: event.title.clone(),
                })
            })
            .collect();

        listed.sort_by(|a, b| b.attendee.registration_date.cmp(&a.attendee.registration_date));
        Ok(listed)
    }

    async fn update_attendee(&self, id: Uuid, update: &UpdateAttendeeRequest) -> Result<Attendee> {
        let mut state = self.state.lock().await;
        let mut attendee = state
            .attendees
            .get(&id)
            .cloned()
            .ok_or_else(|| EventHubError::not_found("Attendee", id))?;

        attendee.apply_update(update);
        if state.roster_email_taken(attendee.event, &attendee.email, attendee.id) {
            return Err(EventHubError::DuplicateAttendee { email: attendee.email });
        }

        state.attendees.insert(id, attendee.clone());
        Ok(attendee)
    }

    async fn delete_attendee(&self, id: Uuid) -> Result<bool> {
        let mut state = self.state.lock().await;
        Ok(state.attendees.remove(&id).is_some())
    }

    async fn delete_attendees(&self, ids: &[Uuid]) -> Result<u64> {
        let mut state = self.state.lock().await;
        let removed = ids.iter().filter(|id| state.attendees.remove(*id).is_some()).count();
        Ok(removed as u64)
    }

    async fn count_attendees(&self) -> Result<i64> {
        let state = self.state.lock().await;
        Ok(state.attendees.len() as i64)
    }

    async fn total_revenue(&self) -> Result<f64> {
        let state = self.state.lock().await;
        Ok(state
            .attendees
            .values()
            .filter(|a| a.status.is_paid())
            .filter_map(|a| state.events.get(&a.event))
            .map(|event| event.price)
            .sum())
    }
}
