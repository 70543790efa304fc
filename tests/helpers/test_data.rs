//! Test data builders
//!
//! Random names and emails come from `fake`; emails carry a UUID prefix so
//! accounts never collide inside one reference database.

use chrono::{Duration, Utc};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use serde_json::{json, Value};
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "correct-horse-battery";

pub fn random_name() -> (String, String) {
    (FirstName().fake(), LastName().fake())
}

pub fn random_email() -> String {
    let email: String = SafeEmail().fake();
    format!("{}.{}", Uuid::new_v4().simple(), email.to_lowercase())
}

/// Event creation body dated a week from now
pub fn event_body(status: &str, capacity: i32, price: f64) -> Value {
    json!({
        "title": "Lindy Hop Social",
        "description": "Friday night social dance with a live band",
        "category": "social",
        "location": "Riverside Ballroom",
        "date": (Utc::now() + Duration::days(7)).to_rfc3339(),
        "price": price,
        "capacity": capacity,
        "status": status,
    })
}

/// Roster entry body for `event`
pub fn attendee_body(event: Uuid, status: &str, ticket_type: &str) -> Value {
    let (first, last) = random_name();
    json!({
        "event": event,
        "name": format!("{} {}", first, last),
        "email": random_email(),
        "ticketType": ticket_type,
        "status": status,
    })
}
