//! Account and session endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::handlers::{ApiJson, MessageResponse};
use crate::middleware::RequireAdmin;
use crate::models::user::{ForgotPasswordRequest, LoginRequest, ResetPasswordRequest, SignupRequest, TokenResponse};
use crate::state::AppState;
use crate::utils::errors::Result;

pub async fn signup(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SignupRequest>,
) -> Result<Json<TokenResponse>> {
    Ok(Json(state.services.auth_service.signup(request).await?))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    Ok(Json(state.services.auth_service.login(request).await?))
}

pub async fn admin_login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    Ok(Json(state.services.auth_service.admin_login(request).await?))
}

pub async fn create_admin(
    State(state): State<AppState>,
    admin: RequireAdmin,
    ApiJson(request): ApiJson<SignupRequest>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    state.services.auth_service.create_admin(&admin.caller(), request).await?;
    Ok((StatusCode::CREATED, MessageResponse::new("Admin account created successfully")))
}

pub async fn forgot_password(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ForgotPasswordRequest>,
) -> Result<Json<Value>> {
    state.services.auth_service.forgot_password(request).await?;
    Ok(Json(json!({
        "status": "success",
        "message": "If an account exists for that email, a reset link has been sent"
    })))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    ApiJson(request): ApiJson<ResetPasswordRequest>,
) -> Result<Json<TokenResponse>> {
    Ok(Json(state.services.auth_service.reset_password(&token, request).await?))
}
