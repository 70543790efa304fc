//! User repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::PostgresDb;
use crate::models::user::User;
use crate::utils::errors::{EventHubError, Result};
use super::{decode_error, on_unique_violation};

#[async_trait]
pub trait AbstractUsers: Sync + Send {
    /// Insert a new user, failing if the email is taken
    async fn insert_user(&self, user: &User) -> Result<()>;

    /// Fetch a user by id
    async fn fetch_user(&self, id: Uuid) -> Result<Option<User>>;

    /// Fetch a user by (normalized) email
    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Fetch the user holding an unexpired reset token digest
    async fn fetch_user_by_reset_token(&self, token_hash: &str, now: DateTime<Utc>) -> Result<Option<User>>;

    /// Persist every mutable field of an existing user
    async fn save_user(&self, user: &User) -> Result<()>;

    /// Events the user registered for, most recent registration first
    async fn registered_event_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>>;

    /// Events owned by the user, newest first
    async fn organized_event_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>>;
}

const USER_COLUMNS: &str = "id, first_name, last_name, email, password_hash, role, phone, location, bio, \
    reset_password_token, reset_password_expires, created_at";

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    password_hash: String,
    role: String,
    phone: Option<String>,
    location: Option<String>,
    bio: Option<String>,
    reset_password_token: Option<String>,
    reset_password_expires: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = EventHubError;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(User {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            password_hash: row.password_hash,
            role: row.role.parse().map_err(|e| decode_error("role", e))?,
            phone: row.phone,
            location: row.location,
            bio: row.bio,
            reset_password_token: row.reset_password_token,
            reset_password_expires: row.reset_password_expires,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl AbstractUsers for PostgresDb {
    async fn insert_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, first_name, last_name, email, password_hash, role, phone, location, bio, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#
        )
        .bind(user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.phone)
        .bind(&user.location)
        .bind(&user.bio)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| on_unique_violation(e, || EventHubError::DuplicateEmail { email: user.email.clone() }))?;

        Ok(())
    }

    async fn fetch_user(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(User::try_from).transpose()
    }

    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.map(User::try_from).transpose()
    }

    async fn fetch_user_by_reset_token(&self, token_hash: &str, now: DateTime<Utc>) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE reset_password_token = $1 AND reset_password_expires > $2",
            USER_COLUMNS
        ))
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn save_user(&self, user: &User) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET first_name = $2,
                last_name = $3,
                email = $4,
                password_hash = $5,
                role = $6,
                phone = $7,
                location = $8,
                bio = $9,
                reset_password_token = $10,
                reset_password_expires = $11
            WHERE id = $1
            "#
        )
        .bind(user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.phone)
        .bind(&user.location)
        .bind(&user.bio)
        .bind(&user.reset_password_token)
        .bind(user.reset_password_expires)
        .execute(&self.pool)
        .await
        .map_err(|e| on_unique_violation(e, || EventHubError::DuplicateEmail { email: user.email.clone() }))?;

        if result.rows_affected() == 0 {
            return Err(EventHubError::not_found("User", user.id));
        }
        Ok(())
    }

    async fn registered_event_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT event_id FROM event_registrations WHERE user_id = $1 ORDER BY registered_at DESC"
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn organized_event_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM events WHERE user_id = $1 ORDER BY created_at DESC"
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}
