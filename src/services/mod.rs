//! Services module
//!
//! This module contains business logic services

pub mod attendees;
pub mod auth;
pub mod dashboard;
pub mod events;
pub mod mail;
pub mod policy;
pub mod profile;
pub mod registration;

// Re-export commonly used services
pub use attendees::AttendeeService;
pub use auth::{AuthService, Claims, SessionKind, TokenService};
pub use dashboard::DashboardService;
pub use events::{EventListParams, EventService};
pub use mail::{LogMailer, Mailer};
pub use policy::{authorize, Action, Caller, Decision, DenyReason};
pub use profile::ProfileService;
pub use registration::RegistrationService;

use std::sync::Arc;

use crate::config::Settings;
use crate::database::Database;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub auth_service: AuthService,
    pub event_service: EventService,
    pub registration_service: RegistrationService,
    pub attendee_service: AttendeeService,
    pub dashboard_service: DashboardService,
    pub profile_service: ProfileService,
    db: Database,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(db: Database, settings: &Settings, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            auth_service: AuthService::new(db.clone(), settings.auth.clone(), settings.mail.clone(), mailer),
            event_service: EventService::new(db.clone()),
            registration_service: RegistrationService::new(db.clone()),
            attendee_service: AttendeeService::new(db.clone()),
            dashboard_service: DashboardService::new(db.clone()),
            profile_service: ProfileService::new(db.clone()),
            db,
        }
    }

    /// Health check for all services
    pub async fn health_check(&self) -> ServiceHealthStatus {
        let database_healthy = match self.db.health_check().await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "Database health check failed");
                false
            }
        };

        ServiceHealthStatus { database_healthy }
    }
}

/// Health status for all services
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceHealthStatus {
    pub database_healthy: bool,
}

impl ServiceHealthStatus {
    /// Check if all critical services are healthy
    pub fn is_healthy(&self) -> bool {
        self.database_healthy
    }

    /// Get list of unhealthy services
    pub fn get_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !self.database_healthy {
            issues.push("Database connection failed".to_string());
        }

        issues
    }
}
