//! Application state
//!
//! Shared by every request handler through axum's `State` extractor.

use std::sync::Arc;

use crate::config::Settings;
use crate::database::Database;
use crate::services::{Mailer, ServiceFactory};

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub db: Database,
    pub services: ServiceFactory,
}

impl AppState {
    pub fn new(settings: Settings, db: Database, mailer: Arc<dyn Mailer>) -> Self {
        let services = ServiceFactory::new(db.clone(), &settings, mailer);
        Self {
            settings: Arc::new(settings),
            db,
            services,
        }
    }
}
