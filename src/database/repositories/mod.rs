//! Database repositories module
//!
//! Each file declares a storage trait and its Postgres implementation.
//! The in-memory implementation lives in `database::reference`.

pub mod user;
pub mod event;
pub mod attendee;

// Re-export repository traits
pub use user::AbstractUsers;
pub use event::AbstractEvents;
pub use attendee::AbstractAttendees;

use crate::utils::errors::EventHubError;

/// Map a unique-constraint violation to a domain error, passing anything else through
pub(crate) fn on_unique_violation(err: sqlx::Error, conflict: impl FnOnce() -> EventHubError) -> EventHubError {
    match err {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => conflict(),
        other => EventHubError::Database(other),
    }
}

/// Decode failure for a text column holding an unknown enum value
pub(crate) fn decode_error(column: &str, err: EventHubError) -> EventHubError {
    EventHubError::Database(sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(err),
    })
}

/// Escape LIKE wildcards in user input and wrap it for a substring match
pub(crate) fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
