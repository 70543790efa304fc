//! Dashboard rollups

use chrono::Utc;

use crate::database::Database;
use crate::models::dashboard::{AdminDashboardStats, UserDashboardStats};
use crate::services::policy::{authorize, Action, Caller};
use crate::utils::errors::Result;

const RECENT_EVENTS: i64 = 5;

#[derive(Clone)]
pub struct DashboardService {
    db: Database,
}

impl DashboardService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn admin_stats(&self, caller: &Caller) -> Result<AdminDashboardStats> {
        authorize(caller, Action::ViewAdminDashboard, None).into_result("dashboard")?;

        Ok(AdminDashboardStats {
            total_events: self.db.count_events().await?,
            total_attendees: self.db.count_attendees().await?,
            total_revenue: self.db.total_revenue().await?,
            recent_events: self.db.recent_events(RECENT_EVENTS).await?,
        })
    }

    pub async fn user_stats(&self, caller: &Caller) -> Result<UserDashboardStats> {
        authorize(caller, Action::ViewProfile, None).into_result("dashboard")?;
        let user_id = caller.require_id()?;

        let events = self.db.registered_events(user_id).await?;
        Ok(UserDashboardStats::from_events(&events, Utc::now()))
    }
}
