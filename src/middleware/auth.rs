//! Authentication extractors
//!
//! Bearer tokens are resolved against the stored user record, so a role
//! change takes effect on the next request regardless of what the token says.
//!
//! - [`AuthUser`]: any signed-in user, 401 otherwise
//! - [`RequireAdmin`]: signed-in administrator, 401 or 403 otherwise
//! - [`MaybeAuthUser`]: optional identity for public routes

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::debug;

use crate::models::user::User;
use crate::services::policy::Caller;
use crate::state::AppState;
use crate::utils::errors::EventHubError;

/// Bearer token extracted from `Authorization: Bearer <token>` header.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl BearerToken {
    fn from_parts(parts: &Parts) -> Result<Option<Self>, EventHubError> {
        let header = match parts.headers.get(axum::http::header::AUTHORIZATION) {
            Some(header) => header,
            None => return Ok(None),
        };

        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or_else(|| EventHubError::Unauthorized("Expected 'Bearer <token>'".to_string()))?;

        if token.is_empty() {
            return Err(EventHubError::Unauthorized("Empty bearer token".to_string()));
        }
        Ok(Some(Self(token.to_string())))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = EventHubError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_parts(parts)?
            .ok_or_else(|| EventHubError::Unauthorized("Missing authorization header".to_string()))
    }
}

/// Authenticated user
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl AuthUser {
    pub fn caller(&self) -> Caller {
        Caller::from(&self.0)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = EventHubError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let bearer = BearerToken::from_request_parts(parts, state).await?;
        let user = state.services.auth_service.authenticate(&bearer.0).await?;
        Ok(Self(user))
    }
}

/// Authenticated administrator
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub User);

impl RequireAdmin {
    pub fn caller(&self) -> Caller {
        Caller::from(&self.0)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = EventHubError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(EventHubError::PermissionDenied("Administrator role required".to_string()));
        }
        Ok(Self(user))
    }
}

/// Identity on public routes. A missing or unusable token means anonymous.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<User>);

impl MaybeAuthUser {
    pub fn caller(&self) -> Caller {
        Caller::from(self.0.as_ref())
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = EventHubError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let bearer = match BearerToken::from_parts(parts) {
            Ok(Some(bearer)) => bearer,
            Ok(None) => return Ok(Self(None)),
            Err(e) => {
                debug!(error = %e, "Ignoring malformed authorization header");
                return Ok(Self(None));
            }
        };

        match state.services.auth_service.authenticate(&bearer.0).await {
            Ok(user) => Ok(Self(Some(user))),
            Err(EventHubError::Unauthorized(reason)) => {
                debug!(reason = %reason, "Treating request as anonymous");
                Ok(Self(None))
            }
            Err(e) => Err(e),
        }
    }
}
