//! Authentication service implementation
//!
//! This service handles account creation, password login, session tokens,
//! the password reset flow and seeding of the first administrator.

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{AuthConfig, MailConfig};
use crate::database::Database;
use crate::models::user::{ForgotPasswordRequest, LoginRequest, ResetPasswordRequest, Role, SignupRequest, TokenResponse, User};
use crate::services::mail::Mailer;
use crate::services::policy::{authorize, Action, Caller};
use crate::utils::errors::{EventHubError, Result};
use crate::utils::helpers::{generate_token, hash_token, is_valid_email, normalize_email, require_field};
use crate::utils::logging::{log_admin_action, log_auth_event};

pub const MIN_PASSWORD_LEN: usize = 8;
const RESET_TOKEN_BYTES: usize = 32;

/// Session token payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Which login produced a session; admin sessions live longer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    User,
    Admin,
}

/// Issues and verifies HS256 session tokens
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    user_ttl: Duration,
    admin_ttl: Duration,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            user_ttl: Duration::seconds(config.user_token_ttl_secs as i64),
            admin_ttl: Duration::seconds(config.admin_token_ttl_secs as i64),
        }
    }

    pub fn issue(&self, user: &User, kind: SessionKind) -> Result<String> {
        let ttl = match kind {
            SessionKind::User => self.user_ttl,
            SessionKind::Admin => self.admin_ttl,
        };
        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            role: user.role,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    pub fn verify(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))?;
        Ok(data.claims)
    }
}

/// Validated fields of a new account
struct NewAccount {
    first_name: String,
    last_name: String,
    email: String,
    password: String,
}

fn validate_new_account(request: SignupRequest) -> Result<NewAccount> {
    let first_name = require_field(request.first_name, "First name")?;
    let last_name = require_field(request.last_name, "Last name")?;
    let email = normalize_email(&require_field(request.email, "Email")?);
    if !is_valid_email(&email) {
        return Err(EventHubError::InvalidInput(format!("Invalid email address: {}", email)));
    }
    let password = request.password.unwrap_or_default();
    validate_password(&password)?;

    Ok(NewAccount { first_name, last_name, email, password })
}

fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(EventHubError::InvalidInput(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

fn invalid_credentials() -> EventHubError {
    EventHubError::Unauthorized("Invalid credentials".to_string())
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: Database,
    tokens: TokenService,
    config: AuthConfig,
    mail: MailConfig,
    mailer: Arc<dyn Mailer>,
}

impl AuthService {
    pub fn new(db: Database, config: AuthConfig, mail: MailConfig, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            tokens: TokenService::new(&config),
            db,
            config,
            mail,
            mailer,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Resolve a bearer token to the stored user it names
    pub async fn authenticate(&self, token: &str) -> Result<User> {
        let claims = self
            .tokens
            .verify(token)
            .map_err(|_| EventHubError::Unauthorized("Invalid or expired token".to_string()))?;

        self.db
            .fetch_user(claims.sub)
            .await?
            .ok_or_else(|| EventHubError::Unauthorized("Account no longer exists".to_string()))
    }

    /// bcrypt is CPU-bound, so it runs on the blocking pool
    async fn hash_password(&self, password: String) -> Result<String> {
        let cost = self.config.bcrypt_cost;
        Ok(tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??)
    }

    async fn verify_password(password: String, hash: String) -> Result<bool> {
        Ok(tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??)
    }

    async fn create_account(&self, request: SignupRequest, role: Role) -> Result<User> {
        let account = validate_new_account(request)?;

        // Cheap pre-check; the unique index settles races
        if self.db.fetch_user_by_email(&account.email).await?.is_some() {
            return Err(EventHubError::DuplicateEmail { email: account.email });
        }

        let password_hash = self.hash_password(account.password).await?;
        let user = User::new(account.first_name, account.last_name, account.email, password_hash, role);
        self.db.insert_user(&user).await?;
        Ok(user)
    }

    /// Register a regular account and start a session
    pub async fn signup(&self, request: SignupRequest) -> Result<TokenResponse> {
        let user = self.create_account(request, Role::User).await?;
        log_auth_event(&user.email, "signup", true, None);

        Ok(TokenResponse { token: self.tokens.issue(&user, SessionKind::User)? })
    }

    async fn check_credentials(&self, request: LoginRequest) -> Result<User> {
        let email = normalize_email(&request.email.unwrap_or_default());
        let password = request.password.unwrap_or_default();
        if email.is_empty() || password.is_empty() {
            return Err(EventHubError::InvalidInput("Email and password are required".to_string()));
        }

        let user = match self.db.fetch_user_by_email(&email).await? {
            Some(user) => user,
            None => {
                log_auth_event(&email, "login", false, Some("unknown email"));
                return Err(invalid_credentials());
            }
        };

        if !Self::verify_password(password, user.password_hash.clone()).await? {
            log_auth_event(&email, "login", false, Some("wrong password"));
            return Err(invalid_credentials());
        }
        Ok(user)
    }

    pub async fn login(&self, request: LoginRequest) -> Result<TokenResponse> {
        let user = self.check_credentials(request).await?;
        log_auth_event(&user.email, "login", true, None);

        Ok(TokenResponse { token: self.tokens.issue(&user, SessionKind::User)? })
    }

    /// Password login restricted to administrators, issuing a longer session
    pub async fn admin_login(&self, request: LoginRequest) -> Result<TokenResponse> {
        let user = self.check_credentials(request).await?;
        if !user.is_admin() {
            log_auth_event(&user.email, "admin_login", false, Some("not an administrator"));
            return Err(EventHubError::PermissionDenied("Not an administrator".to_string()));
        }
        log_auth_event(&user.email, "admin_login", true, None);

        Ok(TokenResponse { token: self.tokens.issue(&user, SessionKind::Admin)? })
    }

    /// Create another administrator account
    pub async fn create_admin(&self, caller: &Caller, request: SignupRequest) -> Result<User> {
        authorize(caller, Action::CreateAdmin, None).into_result("admin")?;
        let admin_id = caller.require_id()?;

        let user = self.create_account(request, Role::Admin).await?;
        log_admin_action(admin_id, "create_admin", Some(&user.email), None);
        Ok(user)
    }

    /// Issue a reset token and hand the link to the mailer. Unknown emails
    /// succeed silently so the endpoint does not reveal which accounts exist.
    pub async fn forgot_password(&self, request: ForgotPasswordRequest) -> Result<()> {
        let email = normalize_email(&require_field(request.email, "Email")?);

        let mut user = match self.db.fetch_user_by_email(&email).await? {
            Some(user) => user,
            None => {
                debug!(email = %email, "Password reset requested for unknown email");
                return Ok(());
            }
        };

        let token = generate_token(RESET_TOKEN_BYTES);
        user.reset_password_token = Some(hash_token(&token));
        user.reset_password_expires = Some(Utc::now() + Duration::seconds(self.config.reset_token_ttl_secs as i64));
        self.db.save_user(&user).await?;

        let reset_url = format!("{}/{}", self.mail.reset_url_base.trim_end_matches('/'), token);
        if let Err(e) = self.mailer.send_password_reset(&user.email, &reset_url).await {
            warn!(email = %user.email, error = %e, "Failed to send reset email, revoking token");
            user.reset_password_token = None;
            user.reset_password_expires = None;
            self.db.save_user(&user).await?;
            return Err(e);
        }

        log_auth_event(&user.email, "forgot_password", true, None);
        Ok(())
    }

    /// Consume a reset token, set the new password and start a session
    pub async fn reset_password(&self, token: &str, request: ResetPasswordRequest) -> Result<TokenResponse> {
        let mut user = self
            .db
            .fetch_user_by_reset_token(&hash_token(token), Utc::now())
            .await?
            .ok_or_else(|| EventHubError::InvalidInput("Token is invalid or has expired".to_string()))?;

        let password = request.password.unwrap_or_default();
        if Some(&password) != request.confirm_password.as_ref() {
            return Err(EventHubError::InvalidInput("Passwords do not match".to_string()));
        }
        validate_password(&password)?;

        user.password_hash = self.hash_password(password).await?;
        user.reset_password_token = None;
        user.reset_password_expires = None;
        self.db.save_user(&user).await?;
        log_auth_event(&user.email, "reset_password", true, None);

        Ok(TokenResponse { token: self.tokens.issue(&user, SessionKind::User)? })
    }

    /// Make sure the configured bootstrap administrator exists
    pub async fn ensure_bootstrap_admin(&self) -> Result<Option<User>> {
        let bootstrap = match self.config.bootstrap_admin {
            Some(ref bootstrap) => bootstrap.clone(),
            None => return Ok(None),
        };
        let email = normalize_email(&bootstrap.email);

        if let Some(mut existing) = self.db.fetch_user_by_email(&email).await? {
            if !existing.is_admin() {
                warn!(email = %email, "Promoting existing account to administrator");
                existing.role = Role::Admin;
                self.db.save_user(&existing).await?;
            }
            return Ok(Some(existing));
        }

        let user = self
            .create_account(
                SignupRequest {
                    first_name: Some(bootstrap.first_name),
                    last_name: Some(bootstrap.last_name),
                    email: Some(email),
                    password: Some(bootstrap.password),
                },
                Role::Admin,
            )
            .await?;
        info!(user_id = %user.id, email = %user.email, "Bootstrap administrator created");
        Ok(Some(user))
    }
}
