//! Data models module
//!
//! This module contains all data structures used throughout the application

/// Declares an enum stored and transmitted as fixed text values.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::utils::errors::EventHubError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(crate::utils::errors::EventHubError::InvalidInput(
                        format!("Invalid {}: {}", stringify!($name), other)
                    )),
                }
            }
        }
    };
}

pub mod user;
pub mod event;
pub mod attendee;
pub mod dashboard;

// Re-export commonly used models
pub use user::{Role, User, UserProfile, SignupRequest, LoginRequest, ForgotPasswordRequest, ResetPasswordRequest, UpdateProfileRequest, TokenResponse};
pub use event::{Event, EventStatus, EventSort, EventQuery, Visibility, CreateEventRequest, UpdateEventRequest};
pub use attendee::{Attendee, AttendeeStatus, TicketType, AttendeeQuery, AttendeeWithEvent, CreateAttendeeRequest, UpdateAttendeeRequest};
pub use dashboard::{AdminDashboardStats, UserDashboardStats};
