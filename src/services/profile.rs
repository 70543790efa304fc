//! Profile service implementation

use tracing::info;
use uuid::Uuid;

use crate::database::Database;
use crate::models::event::Event;
use crate::models::user::{UpdateProfileRequest, User, UserProfile};
use crate::services::policy::{authorize, Action, Caller};
use crate::utils::errors::{EventHubError, Result};
use crate::utils::helpers::{is_valid_email, normalize_email, require_field};

#[derive(Clone)]
pub struct ProfileService {
    db: Database,
}

impl ProfileService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn caller_id(caller: &Caller) -> Result<Uuid> {
        authorize(caller, Action::ViewProfile, None).into_result("profile")?;
        caller.require_id()
    }

    async fn profile_of(&self, user: User) -> Result<UserProfile> {
        let registered_events = self.db.registered_event_ids(user.id).await?;
        let organized_events = self.db.organized_event_ids(user.id).await?;
        Ok(UserProfile { user, registered_events, organized_events })
    }

    async fn load(&self, id: Uuid) -> Result<User> {
        self.db
            .fetch_user(id)
            .await?
            .ok_or_else(|| EventHubError::not_found("User", id))
    }

    pub async fn me(&self, caller: &Caller) -> Result<UserProfile> {
        let user = self.load(Self::caller_id(caller)?).await?;
        self.profile_of(user).await
    }

    pub async fn update(&self, caller: &Caller, mut request: UpdateProfileRequest) -> Result<UserProfile> {
        let mut user = self.load(Self::caller_id(caller)?).await?;

        if let Some(name) = request.first_name.take() {
            request.first_name = Some(require_field(Some(name), "First name")?);
        }
        if let Some(name) = request.last_name.take() {
            request.last_name = Some(require_field(Some(name), "Last name")?);
        }
        if let Some(email) = request.email.take() {
            let email = normalize_email(&email);
            if !is_valid_email(&email) {
                return Err(EventHubError::InvalidInput(format!("Invalid email address: {}", email)));
            }
            request.email = Some(email);
        }

        user.apply_profile(&request);
        self.db.save_user(&user).await?;
        info!(user_id = %user.id, "Profile updated");

        self.profile_of(user).await
    }

    /// Events the caller registered for, most recent registration first
    pub async fn my_events(&self, caller: &Caller) -> Result<Vec<Event>> {
        let user_id = Self::caller_id(caller)?;
        self.db.registered_events(user_id).await
    }
}
