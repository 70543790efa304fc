//! Admin dashboard endpoint

use axum::{extract::State, Json};

use crate::middleware::RequireAdmin;
use crate::models::dashboard::AdminDashboardStats;
use crate::state::AppState;
use crate::utils::errors::Result;

pub async fn admin_stats(State(state): State<AppState>, admin: RequireAdmin) -> Result<Json<AdminDashboardStats>> {
    Ok(Json(state.services.dashboard_service.admin_stats(&admin.caller()).await?))
}
