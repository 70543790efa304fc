//! Dashboard rollups

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Event;

/// Admin dashboard figures
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboardStats {
    pub total_events: i64,
    /// Roster entries across all events
    pub total_attendees: i64,
    /// Event price summed over confirmed and checked-in roster entries
    pub total_revenue: f64,
    /// Five most recently created events
    pub recent_events: Vec<Event>,
}

/// Per-user figures for the profile dashboard
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDashboardStats {
    pub registered_count: usize,
    pub upcoming_count: usize,
    pub next_event_date: Option<DateTime<Utc>>,
}

impl UserDashboardStats {
    pub fn from_events(events: &[Event], now: DateTime<Utc>) -> Self {
        let upcoming: Vec<DateTime<Utc>> = events
            .iter()
            .map(|e| e.date)
            .filter(|date| *date > now)
            .collect();

        Self {
            registered_count: events.len(),
            upcoming_count: upcoming.len(),
            next_event_date: upcoming.into_iter().min(),
        }
    }
}
