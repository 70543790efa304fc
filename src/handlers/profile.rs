//! Profile endpoints for the signed-in user

use axum::{extract::State, Json};

use crate::handlers::ApiJson;
use crate::middleware::AuthUser;
use crate::models::dashboard::UserDashboardStats;
use crate::models::event::Event;
use crate::models::user::{UpdateProfileRequest, UserProfile};
use crate::state::AppState;
use crate::utils::errors::Result;

pub async fn get_profile(State(state): State<AppState>, auth: AuthUser) -> Result<Json<UserProfile>> {
    Ok(Json(state.services.profile_service.me(&auth.caller()).await?))
}

pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(request): ApiJson<UpdateProfileRequest>,
) -> Result<Json<UserProfile>> {
    Ok(Json(state.services.profile_service.update(&auth.caller(), request).await?))
}

pub async fn my_events(State(state): State<AppState>, auth: AuthUser) -> Result<Json<Vec<Event>>> {
    Ok(Json(state.services.profile_service.my_events(&auth.caller()).await?))
}

pub async fn dashboard_stats(State(state): State<AppState>, auth: AuthUser) -> Result<Json<UserDashboardStats>> {
    Ok(Json(state.services.dashboard_service.user_stats(&auth.caller()).await?))
}
