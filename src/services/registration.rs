//! Registration engine
//!
//! Rules are evaluated by the storage driver inside one atomic unit (row lock
//! or store lock), in the order existence, status, capacity, duplicate. This
//! service adds the caller check and the audit log around it.

use uuid::Uuid;

use crate::database::Database;
use crate::models::event::Event;
use crate::services::policy::{authorize, Action, Caller};
use crate::utils::errors::Result;
use crate::utils::logging::log_registration;

#[derive(Clone)]
pub struct RegistrationService {
    db: Database,
}

impl RegistrationService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn register(&self, caller: &Caller, event_id: Uuid) -> Result<Event> {
        authorize(caller, Action::Register, None).into_result(event_id)?;
        let user_id = caller.require_id()?;

        let event = self.db.register_attendee(event_id, user_id).await?;
        log_registration(event_id, user_id, "register", event.current_attendees);
        Ok(event)
    }

    pub async fn unregister(&self, caller: &Caller, event_id: Uuid) -> Result<Event> {
        authorize(caller, Action::Register, None).into_result(event_id)?;
        let user_id = caller.require_id()?;

        let event = self.db.unregister_attendee(event_id, user_id).await?;
        log_registration(event_id, user_id, "unregister", event.current_attendees);
        Ok(event)
    }
}
