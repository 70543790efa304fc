//! Attendee roster repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::PostgresDb;
use crate::models::attendee::{Attendee, AttendeeQuery, AttendeeStatus, AttendeeWithEvent, UpdateAttendeeRequest};
use crate::utils::errors::{EventHubError, Result};
use super::{decode_error, like_pattern, on_unique_violation};

#[async_trait]
pub trait AbstractAttendees: Sync + Send {
    /// Insert a roster entry; the (event, email) pair must be unused
    async fn insert_attendee(&self, attendee: &Attendee) -> Result<()>;

    async fn fetch_attendee(&self, id: Uuid) -> Result<Option<Attendee>>;

    /// Roster entries matching a query with their event titles, newest first
    async fn list_attendees(&self, query: &AttendeeQuery) -> Result<Vec<AttendeeWithEvent>>;

    async fn update_attendee(&self, id: Uuid, update: &UpdateAttendeeRequest) -> Result<Attendee>;

    /// Returns false if there was nothing to delete
    async fn delete_attendee(&self, id: Uuid) -> Result<bool>;

    /// Delete every listed entry, returning how many existed
    async fn delete_attendees(&self, ids: &[Uuid]) -> Result<u64>;

    async fn count_attendees(&self) -> Result<i64>;

    /// Sum of event prices over confirmed and checked-in entries
    async fn total_revenue(&self) -> Result<f64>;
}

const ATTENDEE_COLUMNS: &str = "a.id, a.event_id, a.user_id, a.name, a.email, a.phone, a.company, a.job_title, \
    a.ticket_type, a.status, a.registration_date, a.dietary, a.notes";

#[derive(Debug, FromRow)]
struct AttendeeRow {
    id: Uuid,
    event_id: Uuid,
    user_id: Option<Uuid>,
    name: String,
    email: String,
    phone: Option<String>,
    company: Option<String>,
    job_title: Option<String>,
    ticket_type: String,
    status: String,
    registration_date: DateTime<Utc>,
    dietary: Option<String>,
    notes: Option<String>,
}

impl TryFrom<AttendeeRow> for Attendee {
    type Error = EventHubError;

    fn try_from(row: AttendeeRow) -> Result<Self> {
        Ok(Attendee {
            id: row.id,
            event: row.event_id,
            user: row.user_id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            company: row.company,
            job_title: row.job_title,
            ticket_type: row.ticket_type.parse().map_err(|e| decode_error("ticket_type", e))?,
            status: row.status.parse().map_err(|e| decode_error("status", e))?,
            registration_date: row.registration_date,
            dietary: row.dietary,
            notes: row.notes,
        })
    }
}

#[derive(Debug, FromRow)]
struct AttendeeWithEventRow {
    #[sqlx(flatten)]
    attendee: AttendeeRow,
    event_title: String,
}

const USER_FOREIGN_KEY: &str = "attendees_user_id_fkey";

fn map_write_error(err: sqlx::Error, attendee: &Attendee) -> EventHubError {
    match err {
        sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
            match (db_err.constraint(), attendee.user) {
                (Some(USER_FOREIGN_KEY), Some(user)) => EventHubError::not_found("User", user),
                _ => EventHubError::not_found("Event", attendee.event),
            }
        }
        other => on_unique_violation(other, || EventHubError::DuplicateAttendee { email: attendee.email.clone() }),
    }
}

#[async_trait]
impl AbstractAttendees for PostgresDb {
    async fn insert_attendee(&self, attendee: &Attendee) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO attendees (id, event_id, user_id, name, email, phone, company, job_title, ticket_type, status, registration_date, dietary, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#
        )
        .bind(attendee.id)
        .bind(attendee.event)
        .bind(attendee.user)
        .bind(&attendee.name)
        .bind(&attendee.email)
        .bind(&attendee.phone)
        .bind(&attendee.company)
        .bind(&attendee.job_title)
        .bind(attendee.ticket_type.as_str())
        .bind(attendee.status.as_str())
        .bind(attendee.registration_date)
        .bind(&attendee.dietary)
        .bind(&attendee.notes)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, attendee))?;

        Ok(())
    }

    async fn fetch_attendee(&self, id: Uuid) -> Result<Option<Attendee>> {
        let row = sqlx::query_as::<_, AttendeeRow>(&format!("SELECT {} FROM attendees a WHERE a.id = $1", ATTENDEE_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Attendee::try_from).transpose()
    }

    async fn list_attendees(&self, query: &AttendeeQuery) -> Result<Vec<AttendeeWithEvent>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {}, e.title AS event_title FROM attendees a JOIN events e ON e.id = a.event_id WHERE TRUE",
            ATTENDEE_COLUMNS
        ));

        if let Some(status) = query.status {
            builder.push(" AND a.status = ").push_bind(status.as_str());
        }
        if let Some(ticket_type) = query.ticket_type {
            builder.push(" AND a.ticket_type = ").push_bind(ticket_type.as_str());
        }
        if let Some(event_id) = query.event_id {
            builder.push(" AND a.event_id = ").push_bind(event_id);
        }
        if let Some(ref search) = query.search {
            let pattern = like_pattern(search);
            builder
                .push(" AND (a.name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR a.email ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR a.company ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        builder.push(" ORDER BY a.registration_date DESC");

        let rows = builder
            .build_query_as::<AttendeeWithEventRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| {
                Ok(AttendeeWithEvent {
                    attendee: Attendee::try_from(row.attendee)?,
                    event_title: row.event_title,
                })
            })
            .collect()
    }

    async fn update_attendee(&self, id: Uuid, update: &UpdateAttendeeRequest) -> Result<Attendee> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, AttendeeRow>(&format!(
            "SELECT {} FROM attendees a WHERE a.id = $1 FOR UPDATE",
            ATTENDEE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| EventHubError::not_found("Attendee", id))?;

        let mut attendee = Attendee::try_from(row)?;
        attendee.apply_update(update);

        sqlx::query(
            r#"
            UPDATE attendees
            SET name = $2,
                email = $3,
                phone = $4,
                company = $5,
                job_title = $6,
                ticket_type = $7,
                status = $8,
                dietary = $9,
                notes = $10
            WHERE id = $1
            "#
        )
        .bind(attendee.id)
        .bind(&attendee.name)
        .bind(&attendee.email)
        .bind(&attendee.phone)
        .bind(&attendee.company)
        .bind(&attendee.job_title)
        .bind(attendee.ticket_type.as_str())
        .bind(attendee.status.as_str())
        .bind(&attendee.dietary)
        .bind(&attendee.notes)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, &attendee))?;

        tx.commit().await?;
        Ok(attendee)
    }

    async fn delete_attendee(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM attendees WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_attendees(&self, ids: &[Uuid]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query("DELETE FROM attendees WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn count_attendees(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM attendees")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn total_revenue(&self) -> Result<f64> {
        let revenue = sqlx::query_scalar::<_, f64>(
            r#"
            SELECT COALESCE(SUM(e.price), 0)::DOUBLE PRECISION
            FROM attendees a
            JOIN events e ON e.id = a.event_id
            WHERE a.status = ANY($1)
            "#
        )
        .bind(
            AttendeeStatus::ALL
                .iter()
                .filter(|s| s.is_paid())
                .map(|s| s.as_str())
                .collect::<Vec<_>>(),
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(revenue)
    }
}
