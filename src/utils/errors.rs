//! Error handling for EventHub
//!
//! This module defines the main error type used throughout the application
//! and how each variant is reported over HTTP.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::EventStatus;

/// Main error type for EventHub application
#[derive(Error, Debug)]
pub enum EventHubError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication required: {0}")]
    Unauthorized(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: EventStatus, to: EventStatus },

    #[error("Event {event_id} is not open for registration ({status})")]
    EventNotOpen { event_id: Uuid, status: EventStatus },

    #[error("Event {event_id} is full")]
    CapacityExceeded { event_id: Uuid },

    #[error("Already registered for event {event_id}")]
    AlreadyRegistered { event_id: Uuid },

    #[error("Not registered for event {event_id}")]
    NotRegistered { event_id: Uuid },

    #[error("An account with email {email} already exists")]
    DuplicateEmail { email: String },

    #[error("Attendee with email {email} is already on this event's roster")]
    DuplicateAttendee { email: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for EventHub operations
pub type Result<T> = std::result::Result<T, EventHubError>;

impl EventHubError {
    /// Not-found error for any resource kind
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        EventHubError::NotFound { resource, id: id.to_string() }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EventHubError::Database(_) => ErrorSeverity::Critical,
            EventHubError::Migration(_) => ErrorSeverity::Critical,
            EventHubError::Config(_) => ErrorSeverity::Critical,
            EventHubError::Unauthorized(_) => ErrorSeverity::Warning,
            EventHubError::PermissionDenied(_) => ErrorSeverity::Warning,
            EventHubError::Token(_) => ErrorSeverity::Warning,
            EventHubError::PasswordHash(_) => ErrorSeverity::Error,
            EventHubError::Task(_) => ErrorSeverity::Error,
            EventHubError::Serialization(_) => ErrorSeverity::Error,
            EventHubError::Io(_) => ErrorSeverity::Error,
            _ => ErrorSeverity::Info,
        }
    }

    /// HTTP status this error is reported with
    pub fn status_code(&self) -> StatusCode {
        match self {
            EventHubError::NotFound { .. } => StatusCode::NOT_FOUND,
            EventHubError::Unauthorized(_) | EventHubError::Token(_) => StatusCode::UNAUTHORIZED,
            EventHubError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            EventHubError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            EventHubError::InvalidStateTransition { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            EventHubError::EventNotOpen { .. }
            | EventHubError::CapacityExceeded { .. }
            | EventHubError::AlreadyRegistered { .. }
            | EventHubError::NotRegistered { .. }
            | EventHubError::DuplicateEmail { .. }
            | EventHubError::DuplicateAttendee { .. } => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            EventHubError::NotFound { .. } => "NOT_FOUND",
            EventHubError::Unauthorized(_) | EventHubError::Token(_) => "UNAUTHORIZED",
            EventHubError::PermissionDenied(_) => "FORBIDDEN",
            EventHubError::InvalidInput(_) | EventHubError::InvalidStateTransition { .. } => "VALIDATION",
            EventHubError::EventNotOpen { .. } => "INVALID_STATE",
            EventHubError::CapacityExceeded { .. } => "CAPACITY_EXCEEDED",
            EventHubError::AlreadyRegistered { .. } => "ALREADY_REGISTERED",
            EventHubError::NotRegistered { .. } => "NOT_REGISTERED",
            EventHubError::DuplicateEmail { .. } | EventHubError::DuplicateAttendee { .. } => "CONFLICT",
            _ => "INTERNAL",
        }
    }

    /// Message safe to show to the caller
    fn public_message(&self) -> String {
        match self {
            EventHubError::Token(_) => "Token is not valid".to_string(),
            _ if self.status_code().is_server_error() => "Server Error".to_string(),
            other => other.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Error response body (JSON)
#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    msg: String,
}

impl IntoResponse for EventHubError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                severity = %self.severity(),
                error = %self,
                "Request failed with internal error"
            );
        } else {
            tracing::debug!(status = %status, error = %self, "Request rejected");
        }

        let body = ErrorBody {
            code: self.code(),
            msg: self.public_message(),
        };

        (status, Json(body)).into_response()
    }
}
