//! Authorization policy
//!
//! Every access decision goes through [`authorize`]. Hidden and foreign
//! events are reported as missing so callers cannot probe for them.

use uuid::Uuid;

use crate::models::event::{Event, EventQuery, EventSort, EventStatus};
use crate::models::user::User;
use crate::utils::errors::{EventHubError, Result};

/// Who is making the request, as established from the stored user record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    User(Uuid),
    Admin(Uuid),
}

impl Caller {
    pub fn id(&self) -> Option<Uuid> {
        match self {
            Caller::Anonymous => None,
            Caller::User(id) | Caller::Admin(id) => Some(*id),
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Caller::Admin(_))
    }

    /// Identity of an authenticated caller
    pub fn require_id(&self) -> Result<Uuid> {
        self.id()
            .ok_or_else(|| EventHubError::Unauthorized("Authentication required".to_string()))
    }
}

impl From<&User> for Caller {
    fn from(user: &User) -> Self {
        if user.is_admin() {
            Caller::Admin(user.id)
        } else {
            Caller::User(user.id)
        }
    }
}

impl From<Option<&User>> for Caller {
    fn from(user: Option<&User>) -> Self {
        user.map(Caller::from).unwrap_or(Caller::Anonymous)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ReadEvent,
    CreateEvent,
    UpdateEvent,
    DeleteEvent,
    DuplicateEvent,
    Register,
    ViewProfile,
    CreateAdmin,
    ManageAttendees,
    ViewAdminDashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No valid credentials
    Unauthenticated,
    /// Authenticated, but the role is insufficient
    Forbidden,
    /// The resource must look nonexistent to this caller
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    /// Turn a decision into an error, naming `id` when the resource is hidden
    pub fn into_result(self, id: impl ToString) -> Result<()> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(DenyReason::Unauthenticated) => {
                Err(EventHubError::Unauthorized("Authentication required".to_string()))
            }
            Decision::Deny(DenyReason::Forbidden) => {
                Err(EventHubError::PermissionDenied("Administrator role required".to_string()))
            }
            Decision::Deny(DenyReason::Hidden) => Err(EventHubError::not_found("Event", id)),
        }
    }
}

/// Decide whether `caller` may perform `action`, on `event` where one is involved
pub fn authorize(caller: &Caller, action: Action, event: Option<&Event>) -> Decision {
    use Action::*;

    match action {
        ReadEvent => match (caller, event) {
            (Caller::Admin(_), _) => Decision::Allow,
            (_, Some(event)) if event.status == EventStatus::Published => Decision::Allow,
            _ => Decision::Deny(DenyReason::Hidden),
        },
        Register | ViewProfile => match caller {
            Caller::Anonymous => Decision::Deny(DenyReason::Unauthenticated),
            _ => Decision::Allow,
        },
        CreateEvent | DuplicateEvent | CreateAdmin | ManageAttendees | ViewAdminDashboard => require_admin(caller),
        UpdateEvent | DeleteEvent => match require_admin(caller) {
            Decision::Allow => match (caller.id(), event) {
                (Some(id), Some(event)) if event.user == id => Decision::Allow,
                _ => Decision::Deny(DenyReason::Hidden),
            },
            denied => denied,
        },
    }
}

/// Role gate alone, checked before any event is loaded
pub fn require_admin(caller: &Caller) -> Decision {
    match caller {
        Caller::Anonymous => Decision::Deny(DenyReason::Unauthenticated),
        Caller::User(_) => Decision::Deny(DenyReason::Forbidden),
        Caller::Admin(_) => Decision::Allow,
    }
}

/// Build the listing query this caller is entitled to. The status filter is
/// only honoured for admins.
pub fn event_query_for(
    caller: &Caller,
    search: Option<String>,
    category: Option<String>,
    sort: EventSort,
    status: Option<EventStatus>,
) -> EventQuery {
    if caller.is_admin() {
        EventQuery::admin(search, category, sort, status)
    } else {
        EventQuery::public(search, category, sort)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::Visibility;
    use chrono::Utc;

    fn event(owner: Uuid, status: EventStatus) -> Event {
        Event {
            id: Uuid::new_v4(),
            user: owner,
            title: "Shag Workshop".into(),
            description: "Collegiate shag basics".into(),
            category: "workshop".into(),
            location: "Prague".into(),
            date: Utc::now(),
            price: 0.0,
            capacity: 20,
            status,
            current_attendees: 0,
            attendees: Vec::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_read_visibility() {
        let owner = Uuid::new_v4();
        let draft = event(owner, EventStatus::Draft);
        let published = event(owner, EventStatus::Published);

        for caller in [Caller::Anonymous, Caller::User(Uuid::new_v4())] {
            assert_eq!(authorize(&caller, Action::ReadEvent, Some(&published)), Decision::Allow);
            assert_eq!(
                authorize(&caller, Action::ReadEvent, Some(&draft)),
                Decision::Deny(DenyReason::Hidden)
            );
        }
        assert_eq!(authorize(&Caller::Admin(Uuid::new_v4()), Action::ReadEvent, Some(&draft)), Decision::Allow);
    }

    #[test]
    fn test_mutation_requires_admin_and_ownership() {
        let owner = Uuid::new_v4();
        let ev = event(owner, EventStatus::Published);

        assert_eq!(
            authorize(&Caller::Anonymous, Action::UpdateEvent, Some(&ev)),
            Decision::Deny(DenyReason::Unauthenticated)
        );
        assert_eq!(
            authorize(&Caller::User(owner), Action::DeleteEvent, Some(&ev)),
            Decision::Deny(DenyReason::Forbidden)
        );
        assert_eq!(
            authorize(&Caller::Admin(Uuid::new_v4()), Action::UpdateEvent, Some(&ev)),
            Decision::Deny(DenyReason::Hidden)
        );
        assert_eq!(authorize(&Caller::Admin(owner), Action::DeleteEvent, Some(&ev)), Decision::Allow);
        assert_eq!(authorize(&Caller::Admin(Uuid::new_v4()), Action::DuplicateEvent, Some(&ev)), Decision::Allow);
    }

    #[test]
    fn test_deny_maps_to_errors() {
        assert!(matches!(
            Decision::Deny(DenyReason::Unauthenticated).into_result("x"),
            Err(EventHubError::Unauthorized(_))
        ));
        assert!(matches!(
            Decision::Deny(DenyReason::Forbidden).into_result("x"),
            Err(EventHubError::PermissionDenied(_))
        ));
        assert!(matches!(
            Decision::Deny(DenyReason::Hidden).into_result("x"),
            Err(EventHubError::NotFound { resource: "Event", .. })
        ));
    }

    #[test]
    fn test_status_filter_only_for_admins() {
        let query = event_query_for(&Caller::User(Uuid::new_v4()), None, None, EventSort::Date, Some(EventStatus::Draft));
        assert_eq!(query.visibility, Visibility::PublishedOnly);

        let query = event_query_for(&Caller::Admin(Uuid::new_v4()), None, None, EventSort::Date, Some(EventStatus::Draft));
        assert_eq!(query.visibility, Visibility::All { status: Some(EventStatus::Draft) });
    }
}
